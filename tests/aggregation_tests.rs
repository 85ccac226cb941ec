// Merge, grouping and sorting over small trees.


use strata_core::dynamic::Dynamic;
use strata_core::item::Record;
use strata_iter::agg::{GroupByIterator, GroupBySortedCountIterator, MergeIterator, OrderByIterator};
use strata_iter::set::UnionIterator;
use strata_iter::traits::{BoxedIterator, RecordIterator};
use strata_iter::transform::{CountIterator, COUNT_KEY};
use test_records::{drain, ids_leaf, names, prepare, rows_leaf};

fn count_row(id: u64, n: i64) -> BoxedIterator {
    rows_leaf(vec![(id, Dynamic::object_from([(COUNT_KEY, n)]))])
}

fn people() -> BoxedIterator {
    rows_leaf(vec![
        (6, Dynamic::object_from([("team", Dynamic::from("red")), ("age", Dynamic::Int(31))])),
        (5, Dynamic::object_from([("team", Dynamic::from("blue")), ("age", Dynamic::Int(25))])),
        (4, Dynamic::object_from([("team", Dynamic::from("red")), ("age", Dynamic::Int(25))])),
        (3, Dynamic::object_from([("team", Dynamic::from("green")), ("age", Dynamic::Int(40))])),
        (2, Dynamic::object_from([("team", Dynamic::from("blue")), ("age", Dynamic::Int(31))])),
        (1, Dynamic::object_from([("team", Dynamic::from("red")), ("age", Dynamic::Int(19))])),
    ])
}

#[test]
fn merge_sums_counts_on_the_same_id() {
    let mut it = MergeIterator::new(vec![count_row(1, 10), count_row(1, 20), count_row(1, 30)]);
    prepare(&mut it);
    let out = drain(&mut it);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].value().at(COUNT_KEY).unwrap(), &Dynamic::Int(60));
}

#[test]
fn merge_unions_distinct_fields() {
    let mut it = MergeIterator::new(vec![
        rows_leaf(vec![(7, Dynamic::object_from([("assoc1", "a")]))]),
        rows_leaf(vec![(7, Dynamic::object_from([("assoc2", "b")]))]),
        rows_leaf(vec![(7, Dynamic::object_from([("assoc3", "c")]))]),
    ]);
    prepare(&mut it);
    let out = drain(&mut it);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id(), 7);
    assert_eq!(
        out[0].value(),
        &Dynamic::object_from([("assoc1", "a"), ("assoc2", "b"), ("assoc3", "c")])
    );
}

#[test]
fn counts_of_two_subtrees_merge() {
    let left: BoxedIterator = Box::new(CountIterator::new(ids_leaf(&[3, 2, 1])));
    let right: BoxedIterator = Box::new(CountIterator::new(Box::new(UnionIterator::new(vec![
        ids_leaf(&[9, 4]),
        ids_leaf(&[8, 4]),
    ]))));
    let mut it = MergeIterator::new(vec![left, right]);
    prepare(&mut it);
    let out = drain(&mut it);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].value().at(COUNT_KEY).unwrap(), &Dynamic::Int(6));
}

#[test]
fn group_by_is_a_stable_partition_in_key_order() {
    let mut it = GroupByIterator::new(people(), names(&["team"]));
    prepare(&mut it);

    let mut groups = Vec::new();
    while it.next().unwrap() {
        let key = it.key().value().clone();
        let members: Vec<u64> = it.group().iter().map(Record::id).collect();
        groups.push((key, members));
    }
    let key = |s: &str| Dynamic::Array(vec![Dynamic::from(s)]);
    assert_eq!(
        groups,
        vec![
            (key("blue"), vec![5, 2]),
            (key("green"), vec![3]),
            (key("red"), vec![6, 4, 1]),
        ]
    );
}

#[test]
fn group_by_two_attributes() {
    let mut it = GroupByIterator::new(people(), names(&["age", "team"]));
    prepare(&mut it);
    let mut keys = Vec::new();
    while it.next().unwrap() {
        keys.push(it.key().value().to_json());
    }
    assert_eq!(
        keys,
        vec![
            r#"[19, "red"]"#,
            r#"[25, "blue"]"#,
            r#"[25, "red"]"#,
            r#"[31, "blue"]"#,
            r#"[31, "red"]"#,
            r#"[40, "green"]"#,
        ]
    );
}

#[test]
fn sorted_count_over_a_union() {
    let union: BoxedIterator = Box::new(UnionIterator::new(vec![
        rows_leaf(vec![
            (9, Dynamic::object_from([("k", 2i64)])),
            (5, Dynamic::object_from([("k", 1i64)])),
        ]),
        rows_leaf(vec![
            (8, Dynamic::object_from([("k", 2i64)])),
            (5, Dynamic::object_from([("k", 1i64)])),
            (2, Dynamic::object_from([("k", 2i64)])),
        ]),
    ]));
    let mut it = GroupBySortedCountIterator::new(union, names(&["k"]));
    prepare(&mut it);
    let mut out = Vec::new();
    while it.next().unwrap() {
        out.push((it.key().value().clone(), it.count()));
    }
    assert_eq!(
        out,
        vec![
            (Dynamic::Array(vec![Dynamic::Int(2)]), 3),
            (Dynamic::Array(vec![Dynamic::Int(1)]), 1),
        ]
    );
}

#[test]
fn order_by_is_stable() {
    let mut it = OrderByIterator::new(people(), names(&["age"]));
    prepare(&mut it);
    let ids: Vec<u64> = drain(&mut it).iter().map(Record::id).collect();
    assert_eq!(ids, vec![3, 6, 2, 5, 4, 1]);
}

#[test]
fn order_by_ascending_then_descending() {
    let mut it = OrderByIterator::with_directions(people(), names(&["team", "age"]), vec![false, true]);
    prepare(&mut it);
    let ids: Vec<u64> = drain(&mut it).iter().map(Record::id).collect();
    assert_eq!(ids, vec![2, 5, 3, 6, 4, 1]);
}

#[test]
fn order_by_missing_column_keeps_input_order() {
    let mut it = OrderByIterator::new(people(), names(&["height"]));
    prepare(&mut it);
    let ids: Vec<u64> = drain(&mut it).iter().map(Record::id).collect();
    assert_eq!(ids, vec![6, 5, 4, 3, 2, 1]);
}
