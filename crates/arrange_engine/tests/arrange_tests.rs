//! Integration tests for arrangement
//! Tests full and partial passes over small item trees
//!
//! These tests drive the engine the way a host would: build items in an
//! `ItemStore`, arrange, change something, and arrange again.

use arrange_engine::{ArrangeConfig, ArrangeEngine, VePath, Veid, VisualElement, VisualElementFlags};
use item_model::{
    ArrangeAlgorithm, BoundingBox, CompositeItem, Item, ItemId, ItemKind, ItemStore, NoteItem, PageItem, TableItem,
    UnknownItem,
};
use std::collections::BTreeMap;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn page_store(algorithm: ArrangeAlgorithm, columns: usize, children: usize) -> (ItemStore, ItemId, Vec<ItemId>) {
    let mut store = ItemStore::new();
    let root = store
        .insert_root(Item::new(ItemKind::Page(PageItem {
            arrange_algorithm: algorithm,
            grid_number_of_columns: columns,
            ..Default::default()
        })))
        .unwrap();
    let ids = (0..children)
        .map(|_| {
            store
                .add_child(root, Item::new(ItemKind::Note(NoteItem::default())))
                .unwrap()
        })
        .collect();
    (store, root, ids)
}

fn node(engine: &ArrangeEngine, id: ItemId) -> &VisualElement {
    engine.cache().find_single(Veid::item(id)).unwrap()
}

/// Geometry of every cached node, keyed by path text
fn snapshot(engine: &ArrangeEngine) -> BTreeMap<String, VisualElement> {
    engine
        .cache()
        .paths()
        .map(|path| (path.to_string(), engine.cache().require(path).unwrap().clone()))
        .collect()
}

type Layout = (BoundingBox, Option<BoundingBox>, Option<BoundingBox>, Vec<VePath>);

/// Bounds, viewport, child area and children of every cached node
fn layout(engine: &ArrangeEngine) -> BTreeMap<String, Layout> {
    snapshot(engine)
        .into_iter()
        .map(|(path, ve)| {
            (path, (ve.bounds_px, ve.viewport_bounds_px, ve.child_area_bounds_px, ve.children))
        })
        .collect()
}

/// Every child of `path` lies inside its child area, for children placed in
/// that area
fn assert_children_contained(engine: &ArrangeEngine, path: &VePath) {
    let parent = engine.cache().require(path).unwrap();
    let child_area = parent.child_area_bounds_px.unwrap().zero_top_left();
    for child_path in &parent.children {
        if parent.popup.as_ref() == Some(child_path) || parent.selected.as_ref() == Some(child_path) {
            continue;
        }
        let child = engine.cache().require(child_path).unwrap();
        assert!(
            child_area.contains_box(&child.bounds_px),
            "{} at {:?} escapes {:?}",
            child_path,
            child.bounds_px,
            child_area
        );
    }
}

#[test]
fn test_grid_then_list_then_delete() {
    init_tracing();
    let (mut store, root, ids) = page_store(ArrangeAlgorithm::Grid, 3, 7);
    let mut engine = ArrangeEngine::default();
    let top = engine.arrange(&store, root, None).unwrap();

    let fifth = node(&engine, ids[4]);
    assert_eq!((fifth.col, fifth.row), (Some(1), Some(1)));
    assert_eq!(engine.cache().require(&top).unwrap().children.len(), 7);
    let fourth_bounds = node(&engine, ids[3]).bounds_px;
    assert_children_contained(&engine, &top);

    // the same children as a list: one column of rows a block high
    engine.arrange(&store, root, Some(ArrangeAlgorithm::List)).unwrap();
    let config = engine.config().clone();
    for (i, id) in ids.iter().enumerate() {
        let row = node(&engine, *id);
        assert!(row.flags.contains(VisualElementFlags::LINE_ITEM));
        assert_eq!(row.row, Some(i));
        assert_eq!(row.bounds_px.x, 0.0);
        assert_eq!(
            row.bounds_px.y,
            config.list_page_top_padding_px + i as f64 * config.natural_block_size_px
        );
    }

    // removing the first child moves every later one back a slot
    store.remove(ids[0]).unwrap();
    engine.arrange(&store, root, None).unwrap();
    assert!(engine.cache().find(Veid::item(ids[0])).is_empty());
    for (i, id) in ids.iter().enumerate().skip(1) {
        let cell = node(&engine, *id);
        assert_eq!((cell.col, cell.row), (Some((i - 1) % 3), Some((i - 1) / 3)));
    }
    assert_eq!(node(&engine, ids[4]).bounds_px, fourth_bounds);
}

#[test]
fn test_arranging_twice_changes_nothing() {
    let (mut store, root, ids) = page_store(ArrangeAlgorithm::SpatialStretch, 1, 3);
    let table = store
        .add_child(root, Item::new(ItemKind::Table(TableItem::default())).at_gr(900.0, 600.0))
        .unwrap();
    for _ in 0..4 {
        store
            .add_child(table, Item::new(ItemKind::Note(NoteItem::default())))
            .unwrap();
    }
    store
        .add_attachment(ids[0], Item::new(ItemKind::Note(NoteItem::default())))
        .unwrap();

    let mut engine = ArrangeEngine::default();
    engine.arrange(&store, root, None).unwrap();
    let first = snapshot(&engine);
    let before = engine.cache().stats();

    engine.arrange(&store, root, None).unwrap();
    let after = engine.cache().stats();
    assert_eq!(snapshot(&engine), first);
    assert_eq!(after.created, before.created);
    assert_eq!(after.recycled_changed, before.recycled_changed);
    assert_eq!(
        after.recycled_unchanged - before.recycled_unchanged,
        engine.cache().len() as u64
    );
    assert_eq!(after.evicted, before.evicted);
}

#[test]
fn test_detailed_tables_have_child_areas_holding_their_rows() {
    let mut store = ItemStore::new();
    let root = store.insert_root(Item::new(ItemKind::Page(PageItem::default()))).unwrap();
    let table = store
        .add_child(root, Item::new(ItemKind::Table(TableItem::default())).at_gr(120.0, 120.0))
        .unwrap();
    for _ in 0..12 {
        store
            .add_child(table, Item::new(ItemKind::Note(NoteItem::default())))
            .unwrap();
    }
    let mut engine = ArrangeEngine::default();
    engine.arrange(&store, root, None).unwrap();

    let tables: Vec<&VisualElement> = engine
        .cache()
        .paths()
        .map(|path| engine.cache().require(path).unwrap())
        .filter(|ve| ve.is_detailed_table())
        .collect();
    assert_eq!(tables.len(), 1);
    assert!(tables[0].child_area_bounds_px.is_some());
    assert_children_contained(&engine, &tables[0].path);
}

#[test]
fn test_rearrange_subtree_after_store_change() -> anyhow::Result<()> {
    let mut store = ItemStore::new();
    let root = store.insert_root(Item::new(ItemKind::Page(PageItem::default())))?;
    let nested = store.add_child(
        root,
        Item::new(ItemKind::Page(PageItem {
            spatial_width_gr: 10.0 * 60.0,
            ..Default::default()
        }))
        .at_gr(60.0, 60.0),
    )?;
    store.add_child(root, Item::new(ItemKind::Note(NoteItem::default())).at_gr(1200.0, 600.0))?;
    let mut engine = ArrangeEngine::default();
    engine.arrange(&store, root, None)?;

    let nested_path = node(&engine, nested).path.clone();
    assert!(node(&engine, nested).children.is_empty());

    let added = store.add_child(nested, Item::new(ItemKind::Note(NoteItem::default())))?;
    let before = engine.cache().stats();
    let rebuilt = engine.rearrange_subtree(&store, &nested_path)?;
    let after = engine.cache().stats();

    assert_eq!(rebuilt, nested_path);
    assert_eq!(after.partial_passes, before.partial_passes + 1);
    assert_eq!(after.full_passes, before.full_passes);
    assert_eq!(after.created - before.created, 1);
    let nested_node = engine.cache().require(&nested_path)?;
    assert_eq!(nested_node.children, vec![nested_path.child(Veid::item(added))]);
    Ok(())
}

#[test]
fn test_rearranging_a_row_rebuilds_its_table() -> anyhow::Result<()> {
    let mut store = ItemStore::new();
    let root = store.insert_root(Item::new(ItemKind::Page(PageItem::default())))?;
    let table = store.add_child(root, Item::new(ItemKind::Table(TableItem::default())))?;
    let row = store.add_child(table, Item::new(ItemKind::Note(NoteItem::default())))?;
    let mut engine = ArrangeEngine::default();
    engine.arrange(&store, root, None)?;

    let row_path = node(&engine, row).path.clone();
    let rebuilt = engine.rearrange_subtree(&store, &row_path)?;
    assert_eq!(rebuilt, node(&engine, table).path);
    Ok(())
}

#[test]
fn test_resized_note_is_measured_again_by_a_partial_pass() -> anyhow::Result<()> {
    init_tracing();
    let mut store = ItemStore::new();
    let root = store.insert_root(Item::new(ItemKind::Page(PageItem::default())))?;
    let note = store.add_child(root, Item::new(ItemKind::Note(NoteItem::default())).at_gr(120.0, 120.0))?;
    let mut engine = ArrangeEngine::default().with_desktop_bounds(BoundingBox::new(0.0, 0.0, 1200.0, 600.0));
    engine.arrange(&store, root, None)?;
    let note_path = node(&engine, note).path.clone();
    assert_eq!(node(&engine, note).bounds_px.w, 80.0);

    if let Some(ItemKind::Note(item)) = store.get_mut(note).map(|item| &mut item.kind) {
        item.spatial_width_gr = 8.0 * 60.0;
    }
    let rebuilt = engine.rearrange_subtree(&store, &note_path)?;
    assert_eq!(rebuilt, note_path);
    assert_eq!(node(&engine, note).bounds_px.w, 160.0);
    let partial = layout(&engine);

    engine.arrange(&store, root, None)?;
    assert_eq!(layout(&engine), partial);
    Ok(())
}

#[test]
fn test_composite_grows_with_a_partial_pass_over_one_of_its_notes() -> anyhow::Result<()> {
    init_tracing();
    let mut store = ItemStore::new();
    let root = store.insert_root(Item::new(ItemKind::Page(PageItem::default())))?;
    let composite =
        store.add_child(root, Item::new(ItemKind::Composite(CompositeItem::default())).at_gr(120.0, 120.0))?;
    let first = store.add_child(composite, Item::new(ItemKind::Note(NoteItem::default())))?;
    store.add_child(composite, Item::new(ItemKind::Note(NoteItem::default())))?;
    let mut engine = ArrangeEngine::default().with_desktop_bounds(BoundingBox::new(0.0, 0.0, 1200.0, 600.0));
    engine.arrange(&store, root, None)?;
    let first_path = node(&engine, first).path.clone();
    let two_notes_high = node(&engine, composite).bounds_px.h;

    let third = store.add_child(composite, Item::new(ItemKind::Note(NoteItem::default())))?;
    let before = engine.cache().stats();
    let rebuilt = engine.rearrange_subtree(&store, &first_path)?;
    assert_eq!(rebuilt, node(&engine, composite).path);
    assert_eq!(engine.cache().stats().partial_passes, before.partial_passes + 1);
    assert!(node(&engine, composite).bounds_px.h > two_notes_high);
    assert_eq!(node(&engine, composite).children.len(), 3);
    assert!(node(&engine, composite).bounds_px.contains_box(&BoundingBox::new(
        node(&engine, composite).bounds_px.x,
        node(&engine, composite).bounds_px.y + node(&engine, third).bounds_px.y,
        node(&engine, third).bounds_px.w,
        node(&engine, third).bounds_px.h,
    )));
    let partial = layout(&engine);

    engine.arrange(&store, root, None)?;
    assert_eq!(layout(&engine), partial);
    Ok(())
}

#[test]
fn test_config_from_json_fills_defaults() -> anyhow::Result<()> {
    let config = ArrangeConfig::from_json(r#"{ "natural_block_size_px": 30.0, "line_height_px": 30.0 }"#)?;
    assert_eq!(config.natural_block_size_px, 30.0);
    assert_eq!(config.grid_size, ArrangeConfig::default().grid_size);
    assert_eq!(ArrangeConfig::from_json(&config.to_json()?)?, config);
    assert!(ArrangeConfig::from_json("{ not json").is_err());

    // a list page at top level lays rows out at the configured block size
    let (store, root, ids) = page_store(ArrangeAlgorithm::List, 1, 2);
    let mut engine = ArrangeEngine::new(config.with_list_page_top_padding(0.0));
    engine.arrange(&store, root, None)?;
    assert_eq!(node(&engine, ids[1]).bounds_px.y, 30.0);
    Ok(())
}

#[test]
fn test_unknown_item_is_a_placeholder() {
    let mut store = ItemStore::new();
    let root = store.insert_root(Item::new(ItemKind::Page(PageItem::default()))).unwrap();
    let unknown = store
        .add_child(
            root,
            Item::new(ItemKind::Unknown(UnknownItem {
                type_tag: "hologram".to_string(),
            }))
            .at_gr(60.0, 60.0),
        )
        .unwrap();
    let mut engine = ArrangeEngine::default().with_desktop_bounds(BoundingBox::new(0.0, 0.0, 1200.0, 600.0));
    engine.arrange(&store, root, None).unwrap();

    let placeholder = node(&engine, unknown);
    assert!(placeholder.flags.contains(VisualElementFlags::UNKNOWN_ITEM));
    assert_eq!(placeholder.bounds_px, BoundingBox::new(20.0, 20.0, 20.0, 20.0));
}

#[test]
fn test_arranging_a_missing_root_fails_and_keeps_the_cache_usable() {
    let (store, root, _) = page_store(ArrangeAlgorithm::SpatialStretch, 1, 2);
    let mut engine = ArrangeEngine::default();
    assert!(engine.arrange(&store, ItemId::new(), None).is_err());
    assert!(!engine.cache().in_pass());
    engine.arrange(&store, root, None).unwrap();
    assert_eq!(engine.cache().require(engine.top_level_path().unwrap()).unwrap().children.len(), 2);
}
