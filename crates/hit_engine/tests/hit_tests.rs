//! Integration tests for hit testing
//! Arranges small item trees and checks what lies under chosen positions
//!
//! Positions are worked out from the arranged bounds so the tests follow the
//! layout rather than repeat it.

use arrange_engine::{
    ArrangeConfig, ArrangeEngine, DockSpec, HitboxFlags, PopupSpec, VePath, Veid, VisualElement,
};
use hit_engine::{hit_test, HitInfo};
use item_model::{
    ArrangeAlgorithm, BoundingBox, Item, ItemId, ItemKind, ItemStore, NoteItem, PageItem, RatingItem,
    TableItem, Vector,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A desktop with the same aspect as a default page, so one block is 20 px
fn engine_with(config: ArrangeConfig) -> ArrangeEngine {
    ArrangeEngine::new(config).with_desktop_bounds(BoundingBox::new(0.0, 0.0, 1200.0, 600.0))
}

fn node<'e>(engine: &'e ArrangeEngine, id: ItemId) -> &'e VisualElement {
    engine.cache().find_single(Veid::item(id)).unwrap()
}

fn hit(engine: &ArrangeEngine, x: f64, y: f64) -> HitInfo {
    hit_test(engine, Vector::new(x, y), &[], false).unwrap()
}

fn spatial_root(store: &mut ItemStore) -> ItemId {
    store.insert_root(Item::new(ItemKind::Page(PageItem::default()))).unwrap()
}

fn table_item(height_bl: f64) -> Item {
    Item::new(ItemKind::Table(TableItem {
        spatial_height_gr: height_bl * 60.0,
        ..Default::default()
    }))
    .at_gr(600.0, 300.0)
}

#[test]
fn test_note_on_spatial_page() {
    init_tracing();
    let mut store = ItemStore::new();
    let root = spatial_root(&mut store);
    let note = store
        .add_child(root, Item::new(ItemKind::Note(NoteItem::default())).at_gr(600.0, 300.0))
        .unwrap();
    let mut engine = engine_with(ArrangeConfig::default());
    let top = engine.arrange(&store, root, None).unwrap();

    let bounds = node(&engine, note).bounds_px;
    assert_eq!(bounds.top_left(), Vector::new(200.0, 100.0));
    let info = hit(&engine, bounds.x + 30.0, bounds.y + 10.0);
    assert_eq!(info.over_element_path.veid(), Veid::item(note));
    assert!(info.is_over(HitboxFlags::CLICK | HitboxFlags::MOVE));
    assert_eq!(info.root_path, top);
    assert_eq!(info.over_container_path, Some(top.clone()));
    assert_eq!(info.over_positionable_path, Some(top.clone()));

    // empty space is the page itself
    let info = hit(&engine, 900.0, 500.0);
    assert_eq!(info.over_element_path, top);
    assert_eq!(info.hitbox_type, HitboxFlags::NONE);

    // ignoring the note exposes the page under it
    let info = hit_test(&engine, Vector::new(bounds.x + 30.0, bounds.y + 10.0), &[note], false).unwrap();
    assert_eq!(info.over_element_path, top);
}

#[test]
fn test_attachment_wins_over_its_parent() {
    let mut store = ItemStore::new();
    let root = spatial_root(&mut store);
    let note = store
        .add_child(root, Item::new(ItemKind::Note(NoteItem::default())).at_gr(600.0, 300.0))
        .unwrap();
    let rating = store
        .add_attachment(note, Item::new(ItemKind::Rating(RatingItem::default())))
        .unwrap();
    let mut engine = engine_with(ArrangeConfig::default());
    let top = engine.arrange(&store, root, None).unwrap();

    let note_bounds = node(&engine, note).bounds_px;
    let attachment = node(&engine, rating);
    let x = note_bounds.x + attachment.bounds_px.center().x;
    let y = note_bounds.y + attachment.bounds_px.bottom() / 2.0;

    let info = hit(&engine, x, y);
    assert_eq!(info.over_element_path, attachment.path);
    assert!(info.is_over(HitboxFlags::OPEN_ATTACHMENT));
    assert_eq!(info.over_container_path, Some(top.clone()));
    assert_eq!(info.over_positionable_path, Some(top));

    let info = hit_test(&engine, Vector::new(x, y), &[], true).unwrap();
    assert_eq!(info.over_element_path.veid(), Veid::item(note));
}

#[test]
fn test_attachment_over_table_resize_wins() -> anyhow::Result<()> {
    init_tracing();
    let mut store = ItemStore::new();
    let root = spatial_root(&mut store);
    let table = store.add_child(root, table_item(3.0))?;
    let rating = store.add_attachment(table, Item::new(ItemKind::Rating(RatingItem::default())))?;

    // attachments six blocks across reach down over the resize corner
    let config = ArrangeConfig {
        attachment_scale: 6.0,
        ..Default::default()
    };
    let mut engine = engine_with(config);
    let top = engine.arrange(&store, root, None)?;

    let table_node = node(&engine, table);
    let corner = Vector::new(table_node.bounds_px.right() - 2.0, table_node.bounds_px.bottom() - 3.0);
    let attachment = node(&engine, rating);
    assert!(attachment
        .bounds_px
        .is_inside(corner.sub(table_node.bounds_px.top_left())));

    let info = hit_test(&engine, corner, &[], false)?;
    assert_eq!(info.over_element_path, attachment.path);
    assert!(!info.is_over(HitboxFlags::RESIZE));
    assert_eq!(info.over_container_path, Some(table_node.path.clone()));
    assert_eq!(info.over_positionable_path, Some(top));
    Ok(())
}

#[test]
fn test_bare_table_resize_corner() -> anyhow::Result<()> {
    let mut store = ItemStore::new();
    let root = spatial_root(&mut store);
    let table = store.add_child(root, table_item(3.0))?;
    store.add_child(table, Item::new(ItemKind::Note(NoteItem::default())))?;
    let mut engine = engine_with(ArrangeConfig::default());
    let top = engine.arrange(&store, root, None)?;

    let bounds = node(&engine, table).bounds_px;
    let info = hit_test(&engine, Vector::new(bounds.right() - 2.0, bounds.bottom() - 3.0), &[], false)?;
    assert_eq!(info.hitbox_type, HitboxFlags::RESIZE);
    assert_eq!(info.over_element_path.veid(), Veid::item(table));
    assert_eq!(info.over_positionable_path, Some(top));
    Ok(())
}

#[test]
fn test_table_column_resize_and_header() {
    let mut store = ItemStore::new();
    let root = spatial_root(&mut store);
    let table = store
        .add_child(
            root,
            Item::new(ItemKind::Table(TableItem {
                number_of_visible_columns: 2,
                show_col_header: true,
                ..Default::default()
            }))
            .at_gr(600.0, 300.0),
        )
        .unwrap();
    for _ in 0..3 {
        store
            .add_child(table, Item::new(ItemKind::Note(NoteItem::default())))
            .unwrap();
    }
    let mut engine = engine_with(ArrangeConfig::default());
    engine.arrange(&store, root, None).unwrap();

    let table_node = node(&engine, table);
    let bounds = table_node.bounds_px;
    let block = table_node.block_size_px.unwrap();

    // the boundary between the two four block columns, in the body
    let info = hit(&engine, bounds.x + 4.0 * block.w, bounds.y + 3.5 * block.h);
    assert_eq!(info.hitbox_type, HitboxFlags::COL_RESIZE);
    assert_eq!(info.over_element_meta.and_then(|m| m.col_num), Some(0));

    // the second column header
    let info = hit(&engine, bounds.x + 6.0 * block.w, bounds.y + 1.5 * block.h);
    assert_eq!(info.over_element_path, table_node.path);
    assert!(info.is_over(HitboxFlags::CLICK));
    assert_eq!(info.over_element_meta.and_then(|m| m.col_num), Some(1));
}

#[test]
fn test_scrolled_table_rows_map_back_to_items() {
    init_tracing();
    let mut store = ItemStore::new();
    let root = spatial_root(&mut store);
    let table = store.add_child(root, table_item(5.0)).unwrap();
    let rows: Vec<ItemId> = (0..10)
        .map(|_| {
            store
                .add_child(table, Item::new(ItemKind::Note(NoteItem::default())))
                .unwrap()
        })
        .collect();
    let mut engine = engine_with(ArrangeConfig::default());
    engine.arrange(&store, root, None).unwrap();

    let table_path = node(&engine, table).path.clone();
    let table_node = engine.cache().require(&table_path).unwrap();
    let viewport = table_node.viewport_bounds_px.unwrap();
    let block = table_node.block_size_px.unwrap();
    let first_visible_row = Vector::new(viewport.x + 2.5 * block.w, viewport.y + block.h / 2.0);

    let info = hit_test(&engine, first_visible_row, &[], false).unwrap();
    assert_eq!(info.over_element_path, table_path.child(Veid::item(rows[0])));
    assert_eq!(info.over_container_path, Some(table_path.clone()));

    for k in [3, 6] {
        let previous = engine.scroll().table_scroll_y_pos(table_path.veid());
        engine.scroll_mut().set_table_scroll_y_pos(table_path.veid(), k as f64);
        engine
            .rearrange_table_after_scroll(&store, &table_path, previous)
            .unwrap();
        let info = hit_test(&engine, first_visible_row, &[], false).unwrap();
        assert_eq!(info.over_element_path, table_path.child(Veid::item(rows[k])));
        assert!(info.is_over(HitboxFlags::CLICK));
    }
}

#[test]
fn test_popup_takes_precedence() {
    let mut store = ItemStore::new();
    let root = store
        .insert_root(Item::new(ItemKind::Page(PageItem {
            arrange_algorithm: ArrangeAlgorithm::Grid,
            ..Default::default()
        })))
        .unwrap();
    let mut pages = Vec::new();
    for _ in 0..12 {
        pages.push(
            store
                .add_child(root, Item::new(ItemKind::Page(PageItem::default())))
                .unwrap(),
        );
    }
    let mut engine = ArrangeEngine::default().with_desktop_bounds(BoundingBox::new(0.0, 0.0, 1000.0, 800.0));
    engine.ui_mut().set_popup(PopupSpec::page(Veid::item(pages[0])));
    let top = engine.arrange(&store, root, None).unwrap();

    let popup_path = engine.cache().require(&top).unwrap().popup.clone().unwrap();
    let popup = engine.cache().require(&popup_path).unwrap();
    let bounds = popup.bounds_px;

    // the popup's own edge
    let info = hit(&engine, bounds.x + 2.0, bounds.center().y);
    assert_eq!(info.over_element_path, popup_path);
    assert_eq!(info.root_path, popup_path);
    assert!(info.is_over(HitboxFlags::MOVE));

    // inside it, over grid cells drawn underneath
    let info = hit(&engine, bounds.center().x, bounds.center().y);
    assert_eq!(info.root_path, popup_path);
    assert!(info.over_element_path.is_same_or_descendant_of(&popup_path));
    assert_eq!(info.over_positionable_path, Some(popup_path.clone()));

    // outside it, the grid is hit as usual
    let info = hit(&engine, 5.0, 5.0);
    assert_eq!(info.root_path, top);
}

fn list_store(rows: usize) -> (ItemStore, ItemId, Vec<ItemId>) {
    let mut store = ItemStore::new();
    let root = store
        .insert_root(Item::new(ItemKind::Page(PageItem {
            arrange_algorithm: ArrangeAlgorithm::List,
            ..Default::default()
        })))
        .unwrap();
    let ids = (0..rows)
        .map(|_| {
            store
                .add_child(root, Item::new(ItemKind::Note(NoteItem::default())))
                .unwrap()
        })
        .collect();
    (store, root, ids)
}

#[test]
fn test_list_rows_follow_list_scroll() {
    let (store, root, ids) = list_store(50);
    let mut engine = ArrangeEngine::default();
    let top = engine.arrange(&store, root, None).unwrap();

    // rows start 12 px down and are 24 px high
    let info = hit(&engine, 100.0, 40.0);
    assert_eq!(info.over_element_path, top.child(Veid::item(ids[1])));
    assert!(info.is_over(HitboxFlags::CLICK));

    // the list is 1212 px high in an 800 px viewport: half way is 206 px down
    engine.scroll_mut().set_scroll_y_prop(top.veid(), 0.5);
    let info = hit(&engine, 100.0, 100.0);
    assert_eq!(info.over_element_path, top.child(Veid::item(ids[12])));
    assert_eq!(info.over_container_path, Some(top.clone()));
}

#[test]
fn test_selected_list_page_becomes_root() {
    let (mut store, root, _) = list_store(2);
    let page = store
        .add_child(root, Item::new(ItemKind::Page(PageItem::default())))
        .unwrap();
    store
        .add_child(page, Item::new(ItemKind::Note(NoteItem::default())))
        .unwrap();
    let mut engine = ArrangeEngine::default();
    let top = engine.arrange(&store, root, None).unwrap();
    engine.ui_mut().select_list_item(top.veid(), Veid::item(page));
    engine.arrange(&store, root, None).unwrap();

    let selected_path: VePath = engine.cache().require(&top).unwrap().selected.clone().unwrap();
    let info = hit(&engine, 700.0, 400.0);
    assert_eq!(info.root_path, selected_path);
    assert_eq!(info.over_element_path, selected_path);
    assert_eq!(info.over_positionable_path, Some(selected_path.clone()));

    // the list column is still under the list page
    let info = hit(&engine, 100.0, 20.0);
    assert_eq!(info.root_path, top);
}

#[test]
fn test_dock_is_hit_before_the_page() {
    let mut store = ItemStore::new();
    let root = spatial_root(&mut store);
    let dock = store.insert_root(Item::new(ItemKind::Page(PageItem::default()))).unwrap();
    let tile = store
        .add_child(dock, Item::new(ItemKind::Note(NoteItem::default())))
        .unwrap();
    let mut engine = ArrangeEngine::default();
    engine.ui_mut().set_dock(Some(DockSpec {
        page_id: dock,
        width_px: 200.0,
    }));
    let top = engine.arrange(&store, root, None).unwrap();

    let tile_node = node(&engine, tile);
    let dock_path = tile_node.parent_path.clone().unwrap();
    let center = tile_node.bounds_px.center();
    let info = hit(&engine, center.x, center.y);
    assert_eq!(info.root_path, dock_path);
    assert_eq!(info.over_element_path, tile_node.path);
    assert_eq!(info.over_container_path, Some(dock_path));

    let info = hit(&engine, 600.0, 400.0);
    assert_eq!(info.root_path, top);
}

#[test]
fn test_hit_before_arrange_is_an_error() {
    let engine = ArrangeEngine::default();
    assert!(hit_test(&engine, Vector::new(10.0, 10.0), &[], false).is_err());
}
