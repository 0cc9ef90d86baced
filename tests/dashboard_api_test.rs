// ==========================================
// 会话 API 集成测试
// ==========================================
// 测试目标: 打开 → 过滤/指标 → 编辑持久化 → 恢复 / 重建
// ==========================================


use avisos_dashboard::api::{ApiError, DashboardSession, OpenMode, SessionOrigin};
use avisos_dashboard::domain::ManagedView;
use avisos_dashboard::engine::RecordEdit;
use avisos_dashboard::logging;
use std::fs;
use test_helpers::{create_sample_source, test_config};

fn open_sample() -> (tempfile::TempDir, DashboardSession) {
    logging::init_test();
    let dir = tempfile::tempdir().unwrap();
    let source = create_sample_source(dir.path()).unwrap();
    let session = DashboardSession::open(test_config(dir.path(), &source), OpenMode::Resume).unwrap();
    (dir, session)
}

#[test]
fn test_summary_and_filters() {
    let (_dir, session) = open_sample();

    let all = session.criteria(Vec::<(String, String)>::new());
    let summary = session.summary(&all);
    assert_eq!(summary.total, 6);
    assert_eq!(summary.managed, 0);
    let mean = summary.mean_criticality.value().unwrap();
    assert!((mean - 57.1).abs() < 1e-9);

    let m01 = session.criteria([("Grupo planif.", "M01"), ("Prioridad", "(Todos)")]);
    let ids: Vec<&str> = session.filtered(&m01).iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["10001", "10002"]);

    let combined = session.criteria([("Indicador ABC", "A"), ("Prioridad", "1")]);
    assert_eq!(session.filtered(&combined).len(), 2);

    // 空视图: 指标为无数据
    let none = session.criteria([("Grupo planif.", "ZZZ")]);
    let empty = session.summary(&none);
    assert_eq!(empty.total, 0);
    assert!(empty.mean_criticality.is_no_data());
    assert!(empty.managed_pct.is_no_data());
}

#[test]
fn test_group_stats_and_histogram() {
    let (_dir, session) = open_sample();

    let stats = session.group_stats("Grupo planif.", "criticidad_final");
    let groups: Vec<&str> = stats.iter().map(|s| s.group.as_str()).collect();
    assert_eq!(groups, vec!["M01", "M02", "M03"]);
    assert!((stats[0].mean.value().unwrap() - 63.7).abs() < 1e-9);
    assert_eq!(stats[1].records, 2);
    assert!(stats[1].mean.is_no_data());
    assert_eq!(stats[2].mean.value(), Some(100.0));

    assert!(session.group_stats("No existe", "criticidad_final").is_empty());

    let histogram = session.histogram(&session.criteria(Vec::<(String, String)>::new()));
    assert_eq!(histogram.len(), 100);
    assert_eq!(histogram.iter().map(|b| b.count).sum::<usize>(), 4);
    assert_eq!(histogram[0].count, 1);
    assert_eq!(histogram[99].count, 1);

    assert_eq!(session.color_for(Some(100.0)), "#e74c3c");
}

#[test]
fn test_edits_persist_and_resume() {
    logging::init_test();
    let dir = tempfile::tempdir().unwrap();
    let source = create_sample_source(dir.path()).unwrap();
    let config = test_config(dir.path(), &source);

    let mut session = DashboardSession::open(config.clone(), OpenMode::Resume).unwrap();
    let edits = vec![
        RecordEdit::SetManaged { id: "10002".to_string(), value: true },
        RecordEdit::SetTicket { id: "10002".to_string(), value: "OT-55".to_string() },
        RecordEdit::SetManaged { id: "99999".to_string(), value: true },
    ];
    assert_eq!(session.apply_edits(&edits).unwrap(), 2);

    let managed = session.view(ManagedView::ManagedOnly, &session.criteria(Vec::<(String, String)>::new()));
    assert_eq!(managed.len(), 1);

    let resumed = DashboardSession::open(config, OpenMode::Resume).unwrap();
    assert_eq!(resumed.origin(), SessionOrigin::Persisted);
    assert_eq!(resumed.store().len(), 6);
    let aviso = resumed.store().get("10002").unwrap();
    assert!(aviso.managed);
    assert_eq!(aviso.ticket, "OT-55");
    assert_eq!(aviso.criticality, Some(35.0));

    // 持久化前后的记录数、已处理与工单号一致
    for (before, after) in session.store().records().iter().zip(resumed.store().records()) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.managed, after.managed);
        assert_eq!(before.ticket, after.ticket);
    }
}

#[test]
fn test_csv_state_survives_resume() {
    logging::init_test();
    let dir = tempfile::tempdir().unwrap();
    let source = create_sample_source(dir.path()).unwrap();
    let mut config = test_config(dir.path(), &source);
    config.state_path = dir.path().join("estado.csv");

    let mut session = DashboardSession::open(config.clone(), OpenMode::Resume).unwrap();
    assert_eq!(session.origin(), SessionOrigin::Source);
    assert!(session.set_managed("10004", true).unwrap());
    assert!(session.set_ticket("10004", "OT-4").unwrap());

    // 状态文件按扩展名写成 CSV
    let content = fs::read_to_string(&config.state_path).unwrap();
    assert!(content.starts_with("Aviso,"));

    let resumed = DashboardSession::open(config, OpenMode::Resume).unwrap();
    assert_eq!(resumed.origin(), SessionOrigin::Persisted);
    assert_eq!(resumed.store().len(), 6);
    let aviso = resumed.store().get("10004").unwrap();
    assert!(aviso.managed);
    assert_eq!(aviso.ticket, "OT-4");
}

#[test]
fn test_failed_save_rolls_back_edit() {
    let (dir, mut session) = open_sample();
    let before = session.store().records().to_vec();

    // 状态目录被同名文件占据，保存必然失败
    let state_dir = dir.path().join("estado");
    fs::remove_dir_all(&state_dir).unwrap();
    fs::write(&state_dir, b"bloqueado").unwrap();

    assert!(session.set_managed("10001", true).is_err());
    assert!(session.set_ticket("10001", "OT-1").is_err());
    let edits = vec![RecordEdit::SetManaged { id: "10003".to_string(), value: true }];
    assert!(session.apply_edits(&edits).is_err());

    assert_eq!(session.store().records(), before.as_slice());
}

#[test]
fn test_corrupted_state_is_rebuilt() {
    logging::init_test();
    let dir = tempfile::tempdir().unwrap();
    let source = create_sample_source(dir.path()).unwrap();
    let config = test_config(dir.path(), &source);

    fs::create_dir_all(config.state_path.parent().unwrap()).unwrap();
    fs::write(&config.state_path, b"contenido corrupto").unwrap();

    let session = DashboardSession::open(config.clone(), OpenMode::Resume).unwrap();
    assert_eq!(session.origin(), SessionOrigin::RebuiltAfterCorruption);
    assert_eq!(session.store().len(), 6);

    // 重建后状态文件可再次读取
    let again = DashboardSession::open(config, OpenMode::Resume).unwrap();
    assert_eq!(again.origin(), SessionOrigin::Persisted);
}

#[test]
fn test_missing_source_without_state_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &dir.path().join("no_existe.xlsx"));

    let result = DashboardSession::open(config, OpenMode::Resume);
    assert!(matches!(result, Err(ApiError::SourceNotFound(_))));
}

#[test]
fn test_import_state_from_export() {
    let (dir, mut session) = open_sample();
    assert!(session.set_managed("10005", true).unwrap());
    assert!(session.set_ticket("10005", "INC-5").unwrap());

    let exported = dir.path().join("export.xlsx");
    session.export_xlsx(&exported).unwrap();

    // 从源表格重建后，再把导出的状态合并回来
    let mut rebuilt = DashboardSession::open(session.config().clone(), OpenMode::Rebuild).unwrap();
    assert!(!rebuilt.store().get("10005").unwrap().managed);

    assert_eq!(rebuilt.import_state(&exported).unwrap(), 1);
    let aviso = rebuilt.store().get("10005").unwrap();
    assert!(aviso.managed);
    assert_eq!(aviso.ticket, "INC-5");

    let missing = rebuilt.import_state(dir.path().join("no_existe.xlsx"));
    assert!(matches!(missing, Err(ApiError::NotFound(_))));
}

#[test]
fn test_export_csv_filtered_view() {
    let (dir, session) = open_sample();
    let path = dir.path().join("vista.csv");

    let criteria = session.criteria([("Indicador ABC", "B")]);
    assert_eq!(session.export_csv(&path, &criteria).unwrap(), 2);

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Aviso,Fecha de aviso,Descripción"));
    assert!(lines[0].ends_with("Gestionado,Ticket"));
    assert!(lines[1].starts_with("10002,2025-01-21,"));
    assert!(lines[2].starts_with("10005,"));
}
