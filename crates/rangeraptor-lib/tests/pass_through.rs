use rangeraptor_lib::{C2Criterion, Error, PassThroughPoint, PassThroughPointsService};

fn service() -> PassThroughPointsService {
    PassThroughPointsService::new(
        &[
            PassThroughPoint::named("north", vec![1, 2]),
            PassThroughPoint::named("south", vec![4]),
        ],
        6,
    )
    .expect("valid via points")
}

fn c2_after(service: &PassThroughPointsService, stops: &[usize]) -> u32 {
    stops
        .iter()
        .fold(service.initial_c2(), |c2, &stop| service.visit_stop(c2, stop))
}

#[test]
fn journey_visiting_every_point_in_order_is_kept() {
    let service = service();
    let c2 = c2_after(&service, &[0, 2, 3, 4, 5]);
    assert_eq!(c2, 0);
    assert!(service.accept_at_destination(c2));
}

#[test]
fn journey_missing_a_point_is_discarded() {
    let service = service();
    let c2 = c2_after(&service, &[0, 2, 3, 5]);
    assert_eq!(c2, 1);
    assert!(!service.accept_at_destination(c2));

    // south before north does not count
    let c2 = c2_after(&service, &[4, 1, 5]);
    assert_eq!(c2, 1);
    assert!(!service.accept_at_destination(c2));
}

#[test]
fn fewer_remaining_points_dominate() {
    let dominance = service().dominance();
    assert!(dominance(0, 1));
    assert!(!dominance(1, 1));
    assert!(!dominance(2, 1));
}

#[test]
fn invalid_points_are_configuration_errors() {
    let empty = PassThroughPointsService::new(&[PassThroughPoint::new(Vec::new())], 6);
    assert!(matches!(empty, Err(Error::InvalidRequest { .. })));

    let out_of_range = PassThroughPointsService::new(&[PassThroughPoint::new(vec![9])], 6);
    assert!(matches!(
        out_of_range,
        Err(Error::StopIndexOutOfRange {
            index: 9,
            num_stops: 6
        })
    ));
}
