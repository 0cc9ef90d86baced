// ==========================================
// 仓储层集成测试
// ==========================================
// 测试目标: 状态文件保存/读取、Excel 导出格式
// ==========================================


use avisos_dashboard::config::DashboardConfig;
use avisos_dashboard::engine::RecordStore;
use avisos_dashboard::importer::{AvisoImporter, RawCell, UniversalFileParser};
use avisos_dashboard::repository::{PersistedState, PersistentStateRepository, TableExporter};
use calamine::{open_workbook_auto, Reader};
use test_helpers::create_sample_source;

fn sample_store(dir: &std::path::Path) -> RecordStore {
    let config = DashboardConfig::default();
    let source = create_sample_source(dir).unwrap();
    let outcome = AvisoImporter::for_source(
        config.catalog(),
        config.desired_columns.clone(),
        config.field_mapper(),
    )
    .import_file(&source)
    .unwrap();
    RecordStore::new(outcome.schema, outcome.avisos)
}

#[test]
fn test_export_xlsx_layout() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = sample_store(dir.path());
    store.set_managed("10001", true);
    store.set_ticket("10001", "INC-1");

    let path = dir.path().join("salida.xlsx");
    TableExporter::default()
        .export_xlsx(store.schema(), store.records(), &path)
        .unwrap();

    let workbook = open_workbook_auto(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Avisos".to_string()]);

    let raw = UniversalFileParser.parse(&path).unwrap();
    assert_eq!(raw.headers, store.schema().headers());
    assert_eq!(raw.row_count(), 6);

    let managed_col = raw.column_index("Gestionado").unwrap();
    let ticket_col = raw.column_index("Ticket").unwrap();
    let id_col = raw.column_index("Aviso").unwrap();
    let crit_col = raw.column_index("criticidad_final").unwrap();

    assert_eq!(raw.cell(0, id_col), &RawCell::Text("10001".to_string()));
    assert_eq!(raw.cell(0, managed_col), &RawCell::Bool(true));
    assert_eq!(raw.cell(1, managed_col), &RawCell::Bool(false));
    assert_eq!(raw.cell(0, ticket_col), &RawCell::Text("INC-1".to_string()));
    assert_eq!(raw.cell(0, crit_col), &RawCell::Number(92.4));
    // 缺失危急度不写入
    assert_eq!(raw.cell(2, crit_col), &RawCell::Empty);
}

#[test]
fn test_state_roundtrip_preserves_records() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = sample_store(dir.path());
    store.set_managed("10003", true);
    // 首尾空格原样保留
    store.set_ticket("10006", "  OT-6 ");

    let repo = PersistentStateRepository::new(dir.path().join("estado.xlsx"));
    repo.save(&store).unwrap();

    let PersistedState::Valid(loaded) = repo.load(&DashboardConfig::default().catalog()) else {
        panic!("expected a valid persisted state");
    };
    assert_eq!(loaded.records(), store.records());
    assert_eq!(loaded.get("10006").unwrap().ticket, "  OT-6 ");
    assert_eq!(loaded.schema().headers(), store.schema().headers());
}
