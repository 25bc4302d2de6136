//! Tests for bounding box construction and queries.

use ogc_common::BoundingBox;

#[test]
fn test_from_corners() {
    let bbox = BoundingBox::from_corners("-125.0 24.0", "-66.0 50.0").unwrap();
    assert_eq!(bbox.min_x, -125.0);
    assert_eq!(bbox.min_y, 24.0);
    assert_eq!(bbox.max_x, -66.0);
    assert_eq!(bbox.max_y, 50.0);

    assert!(BoundingBox::from_corners("-125.0", "-66.0 50.0").is_none());
    assert!(BoundingBox::from_corners("a b", "c d").is_none());
}

#[test]
fn test_from_points() {
    let bbox = BoundingBox::from_points(vec![(0.0, 0.0), (3.0, 2.0), (1.0, -1.0)]).unwrap();
    assert_eq!(bbox.to_array(), [0.0, -1.0, 3.0, 2.0]);

    assert!(BoundingBox::from_points(Vec::new()).is_none());
}

#[test]
fn test_array_round_trip() {
    let bbox = BoundingBox::from_array([-180.0, -90.0, 180.0, 90.0]);
    assert_eq!(bbox.width(), 360.0);
    assert_eq!(bbox.height(), 180.0);
    assert_eq!(bbox.to_array(), [-180.0, -90.0, 180.0, 90.0]);
}

#[test]
fn test_contains_point() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    assert!(bbox.contains_point(5.0, 5.0));
    assert!(bbox.contains_point(0.0, 10.0));
    assert!(!bbox.contains_point(-0.1, 5.0));
}
