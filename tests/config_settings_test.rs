use member_admin::config::config::Config;
use member_admin::data::record::{Record, RecordId};
use member_admin::state::edit_session::CancelPolicy;
use member_admin::state::selection::SelectAllMode;
use member_admin::table_view::{TableSettings, TableView};
use std::io::Write;
use tempfile::NamedTempFile;

fn config_from(text: &str) -> Config {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", text).unwrap();
    Config::load_from(file.path()).unwrap()
}

#[test]
fn test_behavior_section_drives_table() {
    let config = config_from(
        r#"
[behavior]
page_size = 4
revert_on_cancel = true
select_all_mode = "by_ids"
confirm_bulk_delete = true
"#,
    );

    let settings = TableSettings::from_config(&config);
    assert_eq!(settings.page_size, 4);
    assert_eq!(settings.cancel_policy, CancelPolicy::Revert);
    assert_eq!(settings.select_all_mode, SelectAllMode::ByIds);
    assert!(settings.confirm_bulk_delete);

    let records = (1..=9u64)
        .map(|i| Record::new(i).with_field("name", format!("N{}", i)))
        .collect();
    let mut view = TableView::with_records(settings, records);
    assert_eq!(view.page_count(), 3);

    view.begin_edit(RecordId(2));
    view.field_change(RecordId(2), "name", "changed");
    view.cancel_edit();
    assert_eq!(view.store().get(RecordId(2)).unwrap().name(), "N2");
}

#[test]
fn test_saved_config_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.source.url = "http://localhost:9999/members.json".to_string();
    config.source.timeout_secs = Some(3);
    config.keybindings.vim_mode = false;
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.source.url, config.source.url);
    assert_eq!(loaded.source.timeout_secs, Some(3));
    assert!(!loaded.keybindings.vim_mode);
}

#[test]
fn test_invalid_toml_is_an_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[behavior\npage_size = ").unwrap();
    assert!(Config::load_from(file.path()).is_err());
}
