use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TestId(u32);

impl Idx for TestId {
    fn from_usize(idx: usize) -> Self {
        TestId(idx as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[test]
fn push_and_index_round_trip() {
    let mut v: IndexVec<TestId, &str> = IndexVec::new();
    let a = v.push("alpha");
    let b = v.push("beta");
    assert_eq!(v[a], "alpha");
    assert_eq!(v[b], "beta");
    assert_eq!(v.len(), 2);
}

#[test]
fn get_out_of_bounds_is_none() {
    let v: IndexVec<TestId, i32> = IndexVec::new();
    assert_eq!(v.get(TestId(0)), None);
}

#[test]
fn swap_remove_does_not_preserve_order() {
    let mut v: IndexVec<TestId, i32> = IndexVec::new();
    v.push(10);
    v.push(20);
    v.push(30);
    assert_eq!(v.swap_remove(TestId(0)), Some(10));
    assert_eq!(v.as_slice(), &[30, 20]);
}

#[test]
fn indices_enumerate_in_insertion_order() {
    let mut v: IndexVec<TestId, char> = IndexVec::new();
    v.push('a');
    v.push('b');
    v.push('c');
    let idxs: Vec<usize> = v.indices().map(|i| i.index()).collect();
    assert_eq!(idxs, vec![0, 1, 2]);
}

#[test]
fn define_idx_macro_generates_working_index() {
    crate::define_idx!(DemoId);
    let mut v: IndexVec<DemoId, i32> = IndexVec::new();
    let id = v.push(7);
    assert_eq!(v[id], 7);
}
