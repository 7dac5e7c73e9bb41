//! Integration tests for the editor crate

use cfgtree_editor::{
    ConflictPolicy, DocumentWorkspace, EditOutcome, EditorConfig, EditorError, NoticeLevel,
    ScriptedPrompt, TabId, TreeEdit,
};
use cfgtree_model::{FetchedModel, ModelParams, NodeId, DEFAULT_BINDING_PREFIX};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

const SCHEMA: &str = r#"
title: 泵站配置
tab-names:
  基本参数: 基本
param-structure:
  基本参数:
    type: group
    children:
      名称:
        type: text
        default: 泵站
      模式:
        type: dropdown
        options: [自动, 手动]
        default: 自动
  设备:
    type: subgroup
    subchildren:
      范围:
        type: range
        default: [0, 1]
      数量:
        default: 3
"#;

fn setup() -> (DocumentWorkspace, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("default.yaml"), SCHEMA).unwrap();
    std::fs::write(
        dir.path().join("pump.json"),
        r#"{"基本参数": {"名称": "一号泵站", "模式": "自动"}, "备注": "无"}"#,
    )
    .unwrap();

    let config = EditorConfig::load(dir.path()).unwrap();
    let ws = DocumentWorkspace::from_config(config, dir.path()).unwrap();
    (ws, dir)
}

fn node(ws: &DocumentWorkspace, labels: &[&str]) -> NodeId {
    ws.current().unwrap().tree.find_by_labels(labels).unwrap()
}

fn open_pump(ws: &mut DocumentWorkspace, dir: &Path) -> TabId {
    ws.open(&dir.join("pump.json"), ConflictPolicy::KeepBoth)
        .unwrap()
        .unwrap()
}

fn fetched(model: &str) -> FetchedModel {
    let params = ModelParams::from_value(&json!({
        "c1": {"name": "Pump", "p1": {"param_name": "阈值", "default": 5}},
        "c2": {"name": "Valve", "p2": {"param_name": "开度", "default": 50}}
    }))
    .unwrap();
    FetchedModel::from_params(params, DEFAULT_BINDING_PREFIX, model)
}

#[test]
fn test_load_edit_save_lifecycle() {
    let (mut ws, dir) = setup();
    let tab = open_pump(&mut ws, dir.path());
    assert_eq!(ws.registry().title(), "泵站配置");

    let mode = node(&ws, &["基本参数", "模式"]);
    let mut prompt = ScriptedPrompt::new([Some("手动")]);
    let outcome = ws.edit_value(mode, &mut prompt).unwrap();
    assert_eq!(outcome, EditOutcome::Changed("手动".into()));
    assert!(ws.current().unwrap().is_dirty(ws.registry()));

    let notice = ws.save(tab).unwrap();
    assert_eq!(notice.level, NoticeLevel::Info);
    assert!(!ws.current().unwrap().is_dirty(ws.registry()));

    let saved: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("pump.json")).unwrap())
            .unwrap();
    assert_eq!(
        saved,
        json!({"基本参数": {"名称": "一号泵站", "模式": "手动"}, "备注": "无"})
    );

    let versions = ws.history_versions().unwrap();
    assert_eq!(versions["pump.json"].len(), 1);
}

#[test]
fn test_edit_nested_leaf_and_reload() {
    let (mut ws, dir) = setup();
    let path = dir.path().join("a.json");
    std::fs::write(&path, r#"{"A": {"x": "1"}}"#).unwrap();

    let tab = ws.open(&path, ConflictPolicy::KeepBoth).unwrap().unwrap();
    let x = node(&ws, &["A", "x"]);
    ws.apply(TreeEdit::SetValue { node: x, value: "2".into() }).unwrap();
    ws.save(tab).unwrap();

    ws.close(tab).unwrap();
    ws.open(&path, ConflictPolicy::KeepBoth).unwrap();
    assert_eq!(Value::Object(ws.current_document().unwrap()), json!({"A": {"x": "2"}}));
}

#[test]
fn test_rejected_dropdown_value_changes_nothing() {
    let (mut ws, dir) = setup();
    open_pump(&mut ws, dir.path());

    let mode = node(&ws, &["基本参数", "模式"]);
    let mut prompt = ScriptedPrompt::new([Some("停止")]);
    let outcome = ws.edit_value(mode, &mut prompt).unwrap();

    assert!(matches!(outcome, EditOutcome::Rejected(_)));
    assert!(!ws.current().unwrap().history.can_undo());
    assert_eq!(ws.current_document().unwrap()["基本参数"]["模式"], json!("自动"));
}

#[test]
fn test_group_nodes_are_not_value_editable() {
    let (mut ws, dir) = setup();
    open_pump(&mut ws, dir.path());

    let group = node(&ws, &["基本参数"]);
    let mut prompt = ScriptedPrompt::new([Some("x")]);
    let outcome = ws.edit_value(group, &mut prompt).unwrap();
    assert!(matches!(outcome, EditOutcome::Rejected(_)));
    assert!(prompt.asked.is_empty());
}

#[test]
fn test_new_document_uses_schema_defaults() {
    let (mut ws, _dir) = setup();
    ws.new_document().unwrap();

    let doc = ws.current_document().unwrap();
    assert_eq!(doc["基本参数"], json!({"名称": "泵站", "模式": "自动"}));
    assert!(ws.current().unwrap().name.starts_with("未命名"));
}

#[test]
fn test_save_untitled_requires_path() {
    let (mut ws, dir) = setup();
    let tab = ws.new_document().unwrap();
    assert!(matches!(ws.save(tab), Err(EditorError::NotFileBacked)));

    ws.save_as(tab, &dir.path().join("fresh")).unwrap();
    assert!(dir.path().join("fresh.json").exists());
    assert_eq!(ws.tab(tab).unwrap().name, "fresh.json");
}

#[test]
fn test_subgroup_instance_from_template() {
    let (mut ws, _dir) = setup();
    ws.new_document().unwrap();

    let devices = node(&ws, &["设备"]);
    ws.apply(TreeEdit::AddSubgroupInstance { parent: devices, point_tag: None })
        .unwrap();
    ws.apply(TreeEdit::AddSubgroupInstance { parent: devices, point_tag: None })
        .unwrap();

    let doc = ws.current_document().unwrap();
    assert_eq!(doc["设备"]["设备 1"], json!({"范围": [], "数量": "3"}));
    assert!(doc["设备"].get("设备 2").is_some());

    let instance = node(&ws, &["设备", "设备 1"]);
    let err = ws.apply(TreeEdit::Remove { node: instance }).unwrap_err();
    assert!(matches!(err, EditorError::Mutation(_)));
}

#[test]
fn test_unbind_removes_only_bound_subtree() {
    let (mut ws, dir) = setup();
    open_pump(&mut ws, dir.path());
    let before = ws.current_document().unwrap();

    let notice = ws.bind_model("泵站模型", fetched("泵站模型")).unwrap();
    assert_eq!(notice.level, NoticeLevel::Info);
    assert!(ws.registry().is_bound());

    let key = format!("{}泵站模型", DEFAULT_BINDING_PREFIX);
    let bound = ws.current_document().unwrap();
    assert_eq!(bound[&key]["Pump"]["阈值"], json!(5));
    assert_eq!(bound[&key]["Valve"]["开度"], json!(50));

    ws.unbind_model().unwrap();
    assert_eq!(ws.current_document().unwrap(), before);
    assert!(!ws.registry().is_bound());
    assert!(ws.current().unwrap().binding.is_none());
}

#[test]
fn test_rebinding_replaces_previous_model() {
    let (mut ws, dir) = setup();
    open_pump(&mut ws, dir.path());

    ws.bind_model("A", fetched("A")).unwrap();
    ws.bind_model("B", fetched("B")).unwrap();

    let doc = ws.current_document().unwrap();
    let bound: Vec<_> = doc
        .keys()
        .filter(|k| k.starts_with(DEFAULT_BINDING_PREFIX))
        .collect();
    assert_eq!(bound, vec![&format!("{}B", DEFAULT_BINDING_PREFIX)]);
}

#[test]
fn test_failed_fetch_reports_notice() {
    let (mut ws, dir) = setup();
    open_pump(&mut ws, dir.path());
    let before = ws.current_document().unwrap();

    let notice = ws.bind_failed("泵站模型", &"connection refused");
    assert!(notice.is_error());
    assert_eq!(ws.current_document().unwrap(), before);
}

#[test]
fn test_switching_tabs_follows_binding() {
    let (mut ws, dir) = setup();
    let bound = open_pump(&mut ws, dir.path());
    ws.bind_model("泵站模型", fetched("泵站模型")).unwrap();

    let plain = ws.new_document().unwrap();
    assert!(!ws.registry().is_bound());

    ws.switch_to(bound).unwrap();
    assert!(ws.registry().is_bound());
    ws.switch_to(plain).unwrap();
    assert!(!ws.registry().is_bound());
}

#[test]
fn test_reopening_bound_file_detects_binding() {
    let (mut ws, dir) = setup();
    let tab = open_pump(&mut ws, dir.path());
    ws.bind_model("泵站模型", fetched("泵站模型")).unwrap();
    ws.save(tab).unwrap();
    ws.close(tab).unwrap();

    open_pump(&mut ws, dir.path());
    let binding = ws.current().unwrap().binding.as_ref().unwrap();
    assert_eq!(binding.model_id, "泵站模型");
    assert!(ws.registry().is_bound());
}

#[test]
fn test_history_version_tab_and_diff() {
    let (mut ws, dir) = setup();
    let tab = open_pump(&mut ws, dir.path());
    ws.save(tab).unwrap();

    let name = node(&ws, &["基本参数", "名称"]);
    ws.apply(TreeEdit::SetValue { node: name, value: "二号泵站".into() })
        .unwrap();

    let versions = ws.history_versions().unwrap();
    let entry = versions["pump.json"][0].clone();

    let session = ws.diff_with_history("pump.json", &entry.timestamp).unwrap();
    let flagged = session.flagged_paths();
    assert!(flagged.contains(&vec!["基本参数".to_string(), "名称".to_string()]));
    assert_eq!(flagged.len(), 1);

    let history_tab = ws.open_history_version("pump.json", &entry.timestamp).unwrap();
    let opened = ws.tab(history_tab).unwrap();
    assert_eq!(opened.name, format!("[历史]pump.json-{}", entry.timestamp));
    assert!(opened.path.is_none());
    assert_eq!(ws.current_document().unwrap()["基本参数"]["名称"], json!("一号泵站"));

    assert!(matches!(
        ws.open_history_version("pump.json", "1999-01-01 00:00:00"),
        Err(EditorError::HistoryVersionNotFound { .. })
    ));
}

#[test]
fn test_applying_diff_copy_to_current_tab() {
    let (mut ws, dir) = setup();
    let tab = open_pump(&mut ws, dir.path());
    ws.save(tab).unwrap();

    let remark = node(&ws, &["备注"]);
    ws.apply(TreeEdit::SetValue { node: remark, value: "检修".into() })
        .unwrap();

    let timestamp = ws.history_versions().unwrap()["pump.json"][0].timestamp.clone();
    let mut session = ws.diff_with_history("pump.json", &timestamp).unwrap();
    session.copy_left_to_right(&["备注"]);
    assert!(session.flagged_paths().is_empty());

    ws.replace_document(session.current.clone(), "Copy from history").unwrap();
    assert_eq!(ws.current_document().unwrap()["备注"], json!("无"));

    ws.undo().unwrap();
    assert_eq!(ws.current_document().unwrap()["备注"], json!("检修"));
}
