use obojobo_styles::{ChunkStyleList, RangeComparison, StyleRange, StyleType, StyledText};
use serde_json::{json, Value};

fn exported_sorted(list: &ChunkStyleList) -> Vec<Value> {
    let mut list = list.clone();
    list.sort();
    list.get_exported_object().unwrap_or_default()
}

#[test]
fn test_remove_link_fragment_keeps_bold() {
    let mut list = ChunkStyleList::new();
    list.add(StyleRange::new(5, 15, "a", json!({"href": "google.com"})));
    list.add(StyleRange::plain(10, 20, "b"));

    list.remove(&StyleRange::plain(10, 11, "a"));

    assert_eq!(
        exported_sorted(&list),
        vec![
            json!({"type": "a", "start": 5, "end": 10, "data": {"href": "google.com"}}),
            json!({"type": "b", "start": 10, "end": 20, "data": {}}),
            json!({"type": "a", "start": 11, "end": 15, "data": {"href": "google.com"}}),
        ]
    );
}

#[test]
fn test_superscript_levels() {
    let mut cancel = ChunkStyleList::new();
    cancel.add(StyleRange::new(1, 4, StyleType::Superscript, json!(3)));
    cancel.add(StyleRange::new(1, 4, StyleType::Superscript, json!(-3)));
    cancel.normalize();
    assert!(cancel.is_empty());

    let mut net = ChunkStyleList::new();
    net.add(StyleRange::new(1, 4, StyleType::Superscript, json!(3)));
    net.add(StyleRange::new(1, 4, StyleType::Superscript, json!(-2)));
    net.normalize();
    assert_eq!(
        net.get_exported_object(),
        Some(vec![json!({"type": "sup", "start": 1, "end": 4, "data": 1})])
    );
}

#[test]
fn test_normalize_twice_is_stable_across_shapes() {
    let shapes: Vec<Vec<StyleRange>> = vec![
        vec![],
        vec![StyleRange::plain(0, 0, "b")],
        vec![
            StyleRange::plain(0, 3, "b"),
            StyleRange::plain(3, 6, "b"),
            StyleRange::plain(1, 2, "i"),
        ],
        vec![
            StyleRange::new(0, 8, "sup", json!(1)),
            StyleRange::new(2, 4, "sup", json!(1)),
            StyleRange::new(6, 10, "sup", json!(-1)),
        ],
        vec![
            StyleRange::new(0, 5, "a", json!({"href": "a"})),
            StyleRange::new(4, 9, "a", json!({"href": "a"})),
            StyleRange::new(9, 12, "a", json!({"href": "b"})),
            StyleRange::plain(7, 7, "q"),
        ],
    ];

    for ranges in shapes {
        let mut list: ChunkStyleList = ranges.into_iter().collect();
        list.normalize();
        let once = exported_sorted(&list);
        list.normalize();
        assert_eq!(exported_sorted(&list), once);
    }
}

#[test]
fn test_list_round_trips_through_json() {
    let raw = json!([
        {"type": "b", "start": 0, "end": 5, "data": {}},
        {"type": "a", "start": 2, "end": 4, "data": {"href": "x.org"}},
        {"type": "highlight", "start": 1, "end": 2, "data": {"color": "red"}}
    ]);

    let list = ChunkStyleList::create_from_object(&raw);
    assert_eq!(list.get_exported_object().map(Value::Array), Some(raw.clone()));

    let via_serde: ChunkStyleList = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(via_serde, list);
}

#[test]
fn test_classification_of_point_inside_range() {
    let range = StyleRange::plain(2, 6, "b");
    assert_eq!(range.compare_to_range(4, None), RangeComparison::Before);
    assert_eq!(range.compare_to_range(4, Some(4)), RangeComparison::Before);
}

#[test]
fn test_editing_session() {
    let mut text = StyledText::new("Hello world");
    text.style_text(StyleType::Bold, 0, 5, json!({}));
    text.style_text(StyleType::Link, 6, 11, json!({"href": "obojobo.ucf.edu"}));

    text.insert_text(5, ",");
    assert_eq!(text.value, "Hello, world");
    assert!(text.style_list.range_has_style(0, 6, &StyleType::Bold));
    assert!(text.style_list.range_has_style(7, 12, &StyleType::Link));

    let tail = text.split(7);
    assert_eq!(text.value, "Hello, ");
    assert_eq!(tail.value, "world");
    assert!(tail.style_list.range_has_style(0, 5, &StyleType::Link));

    text.delete_text(5, 7);
    text.merge(&tail);
    assert_eq!(text.value, "Helloworld");

    let runs = text.runs();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].text, "Hello");
    assert_eq!(runs[1].text, "world");
    assert_eq!(StyledText::from_runs(&runs), text);
}
