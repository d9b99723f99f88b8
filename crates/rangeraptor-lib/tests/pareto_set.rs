use proptest::prelude::*;
use rangeraptor_lib::{Insert, ParetoSet};

type Vector = (i32, i32, i32);

fn any_less(l: &Vector, r: &Vector) -> bool {
    l.0 < r.0 || l.1 < r.1 || l.2 < r.2
}

fn covers(member: &Vector, candidate: &Vector) -> bool {
    member.0 <= candidate.0 && member.1 <= candidate.1 && member.2 <= candidate.2
}

fn vectors() -> impl Strategy<Value = Vec<Vector>> {
    prop::collection::vec((0..8i32, 0..8i32, 0..8i32), 0..60)
}

proptest! {
    #[test]
    fn no_member_dominates_another(inputs in vectors()) {
        let mut set = ParetoSet::new(any_less);
        for v in &inputs {
            set.insert(*v);
        }
        let members = set.as_slice();
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                prop_assert!(any_less(a, b) && any_less(b, a), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn every_inserted_vector_is_covered_by_a_member(inputs in vectors()) {
        let mut set = ParetoSet::new(any_less);
        for v in &inputs {
            set.insert(*v);
        }
        for v in &inputs {
            prop_assert!(set.iter().any(|m| covers(m, v)), "{v:?} is not covered");
        }
    }

    #[test]
    fn insertion_order_does_not_change_the_front(mut inputs in vectors()) {
        let mut forward = ParetoSet::new(any_less);
        for v in &inputs {
            forward.insert(*v);
        }
        inputs.reverse();
        let mut backward = ParetoSet::new(any_less);
        for v in &inputs {
            backward.insert(*v);
        }
        let mut a = forward.into_vec();
        let mut b = backward.into_vec();
        a.sort_unstable();
        b.sort_unstable();
        prop_assert_eq!(a, b);
    }
}

#[test]
fn marker_tracks_elements_added_since_the_last_mark() {
    let mut set = ParetoSet::new(any_less);
    assert!(set.insert((5, 5, 5)).is_accepted());
    assert!(set.insert((1, 9, 9)).is_accepted());
    set.mark_at_end();
    assert!(!set.has_new_elements());

    // evicts (5, 5, 5), which sits before the marker
    let insert = set.insert((4, 4, 4));
    assert_eq!(
        insert,
        Insert::Accepted {
            evicted: vec![(5, 5, 5)]
        }
    );
    assert_eq!(set.since_marker(), &[(4, 4, 4)]);
    assert_eq!(set.len(), 2);

    assert_eq!(set.insert((4, 4, 4)), Insert::Rejected);
    set.mark_at_end();
    assert!(set.since_marker().is_empty());
}
