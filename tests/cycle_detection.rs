use std::cell::Cell;

use expert_filter::{
    BoxError, EquipmentType, Filter, FilterId, FilterRepository, InMemoryRepository,
    ValidationError, and, check_no_cycle, filter_ref, number, or, string,
};

const A: FilterId = FilterId::from_u128(0xA);
const B: FilterId = FilterId::from_u128(0xB);
const C: FilterId = FilterId::from_u128(0xC);
const D: FilterId = FilterId::from_u128(0xD);

fn refs(id: FilterId, targets: &[FilterId]) -> Filter {
    Filter::new(
        id,
        EquipmentType::Line,
        and(vec![
            number("NOMINAL_VOLTAGE").gte(63.0),
            filter_ref("ID").is_part_of(targets.iter().copied()),
        ]),
    )
}

fn leaf(id: FilterId) -> Filter {
    Filter::new(id, EquipmentType::Line, string("ID").exists())
}

struct CountingRepository {
    inner: InMemoryRepository,
    single_fetches: Cell<usize>,
}

impl FilterRepository for CountingRepository {
    fn get_filters(&self, ids: &[FilterId]) -> Result<Vec<Filter>, BoxError> {
        self.inner.get_filters(ids)
    }

    fn get_filter(&self, id: FilterId) -> Result<Option<Filter>, BoxError> {
        self.single_fetches.set(self.single_fetches.get() + 1);
        self.inner.get_filter(id)
    }
}

#[test]
fn a_b_a_is_rejected_with_path() {
    let mut repo = InMemoryRepository::new();
    repo.insert(refs(B, &[A]));

    match check_no_cycle(&refs(A, &[B]), &repo) {
        Err(ValidationError::CycleDetected { path }) => assert_eq!(path, vec![A, B, A]),
        other => panic!("expected CycleDetected, got {other:?}"),
    }
}

#[test]
fn a_b_c_chain_is_accepted() {
    let mut repo = InMemoryRepository::new();
    repo.insert(refs(B, &[C]));
    repo.insert(leaf(C));

    assert!(check_no_cycle(&refs(A, &[B]), &repo).is_ok());
}

#[test]
fn cycle_path_starts_at_root_and_closes_on_repeat() {
    // A -> B -> C -> D -> B
    let mut repo = InMemoryRepository::new();
    repo.insert(refs(B, &[C]));
    repo.insert(refs(C, &[D]));
    repo.insert(refs(D, &[B]));

    match check_no_cycle(&refs(A, &[B]), &repo) {
        Err(ValidationError::CycleDetected { path }) => {
            assert_eq!(path, vec![A, B, C, D, B]);
            assert_eq!(path.first(), Some(&A));
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }
}

#[test]
fn shared_dependency_is_walked_per_path() {
    // A -> {B, C}, B -> D, C -> D: no cycle, D is fetched once per path.
    let mut inner = InMemoryRepository::new();
    inner.insert(refs(B, &[D]));
    inner.insert(refs(C, &[D]));
    inner.insert(leaf(D));
    let repo = CountingRepository {
        inner,
        single_fetches: Cell::new(0),
    };

    assert!(check_no_cycle(&refs(A, &[B, C]), &repo).is_ok());
    // B, D, C, D
    assert_eq!(repo.single_fetches.get(), 4);
}

#[test]
fn repeated_reference_in_one_filter_is_walked_once() {
    let mut inner = InMemoryRepository::new();
    inner.insert(leaf(B));
    let repo = CountingRepository {
        inner,
        single_fetches: Cell::new(0),
    };
    let filter = Filter::new(
        A,
        EquipmentType::Line,
        or(vec![
            filter_ref("ID").is_part_of([B]),
            filter_ref("ID").is_not_part_of([B]),
        ]),
    );

    assert!(check_no_cycle(&filter, &repo).is_ok());
    assert_eq!(repo.single_fetches.get(), 1);
}

#[test]
fn reference_under_or_is_followed() {
    let mut repo = InMemoryRepository::new();
    repo.insert(refs(B, &[A]));
    let a = Filter::new(
        A,
        EquipmentType::Line,
        or(vec![
            string("ID").is("L1"),
            filter_ref("ID").is_not_part_of([B]),
        ]),
    );

    assert!(matches!(
        check_no_cycle(&a, &repo),
        Err(ValidationError::CycleDetected { .. })
    ));
}

#[test]
fn dangling_reference_is_reported() {
    let repo = InMemoryRepository::new();
    match check_no_cycle(&refs(A, &[B]), &repo) {
        Err(ValidationError::FilterNotFound { id }) => assert_eq!(id, B),
        other => panic!("expected FilterNotFound, got {other:?}"),
    }
}

#[test]
fn insert_checked_models_update_workflow() {
    let mut repo = InMemoryRepository::new();
    repo.insert_checked(leaf(C)).unwrap();
    repo.insert_checked(refs(B, &[C])).unwrap();
    repo.insert_checked(refs(A, &[B])).unwrap();

    // Re-pointing C at A would close A -> B -> C -> A.
    let err = repo.insert_checked(refs(C, &[A])).unwrap_err();
    match err {
        ValidationError::CycleDetected { path } => assert_eq!(path, vec![C, A, B, C]),
        other => panic!("expected CycleDetected, got {other:?}"),
    }
    assert_eq!(repo.len(), 3);
}
