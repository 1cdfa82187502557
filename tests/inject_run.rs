//! End-to-end runs of the template injector against a scratch project.

use h0_scaffold::inject::{run, InjectConfig};
use h0_scaffold::model::{CliVersion, TemplateName};
use h0_scaffold::parser::parse_source;
use h0_scaffold::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const UMI_CONFIG: &str = "export default defineConfig({\n  routes: [\n    { path: '/home', component: '@/pages/home' },\n  ],\n});\n";

fn shipped_templates() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}

fn project(tmp: &Path) -> PathBuf {
    let root = tmp.join("project");
    fs::create_dir_all(root.join("src/pages")).unwrap();
    fs::create_dir_all(root.join("config")).unwrap();
    fs::write(root.join("config/config.ts"), UMI_CONFIG).unwrap();
    root
}

fn config(root: &Path, name: &str, template: TemplateName) -> InjectConfig {
    InjectConfig {
        root: root.to_path_buf(),
        app_name: name.to_string(),
        template,
        template_version: None,
        cli_version: CliVersion::HzeroJs,
        sub_module: "aps".to_string(),
        template_root: shipped_templates(),
        check_npm: false,
    }
}

#[test]
fn list_page_is_copied_and_registered() {
    let tmp = TempDir::new().unwrap();
    let root = project(tmp.path());

    let outcome = run(&config(&root, "orderList", TemplateName::ListPage)).unwrap();

    let page_dir = root.join("src/pages/OrderList");
    assert_eq!(outcome.page_dir, page_dir);
    assert_eq!(outcome.route_file, Some(root.join("config/config.ts")));

    let page = fs::read_to_string(page_dir.join("list/listPage.tsx")).unwrap();
    assert!(page.contains("'tarzan.aps.orderList'"));
    assert!(page.contains("'tarzan.aps.common'"));
    assert!(!page.contains("子模块名称"));
    assert!(page_dir.join("stores/listPageDs.ts").is_file());

    let routes = fs::read_to_string(root.join("config/config.ts")).unwrap();
    assert!(routes.contains("'/aps/OrderList'"));
    assert!(routes.contains("'/aps/OrderList/list'"));
    assert!(routes.contains("'@/pages/OrderList/list/listPage'"));
    assert!(routes.contains("'/home'"));
    assert!(!routes.contains('"'));
    assert!(parse_source(Path::new("config.ts"), routes).is_ok());
}

#[test]
fn head_line_list_keeps_the_name() {
    let tmp = TempDir::new().unwrap();
    let root = project(tmp.path());

    run(&config(&root, "lineReport", TemplateName::HeadLineList)).unwrap();

    let page_dir = root.join("src/pages/lineReport");
    assert!(page_dir.join("list/searchForm.tsx").is_file());
    let ds = fs::read_to_string(page_dir.join("stores/lineListDs.ts")).unwrap();
    assert!(ds.contains("tarzan.aps.lineReport"));
}

#[test]
fn missing_template_touches_nothing() {
    let tmp = TempDir::new().unwrap();
    let root = project(tmp.path());

    let err = run(&config(&root, "foo", TemplateName::FilterList)).unwrap_err();

    assert!(matches!(err, Error::TemplateNotFound { .. }));
    assert!(!root.join("src/pages/foo").exists());
    assert_eq!(fs::read_to_string(root.join("config/config.ts")).unwrap(), UMI_CONFIG);
}

#[test]
fn project_without_pages_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("project");
    fs::create_dir_all(&root).unwrap();

    let err = run(&config(&root, "foo", TemplateName::ListPage)).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn missing_route_file_still_copies_template() {
    let tmp = TempDir::new().unwrap();
    let root = project(tmp.path());
    let mut config = config(&root, "foo", TemplateName::ListPage);
    config.cli_version = CliVersion::HzeroCli;

    let outcome = run(&config).unwrap();
    assert_eq!(outcome.route_file, None);
    assert!(root.join("src/pages/Foo/list/listPage.tsx").is_file());
    assert_eq!(fs::read_to_string(root.join("config/config.ts")).unwrap(), UMI_CONFIG);
}

#[test]
fn broken_route_file_aborts_before_copy() {
    let tmp = TempDir::new().unwrap();
    let root = project(tmp.path());
    fs::write(root.join("config/config.ts"), "export default defineConfig({ routes: [ );").unwrap();

    let err = run(&config(&root, "foo", TemplateName::ListPage)).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
    assert!(!root.join("src/pages/Foo").exists());
}

#[test]
fn conflicting_page_dir_is_refused() {
    let tmp = TempDir::new().unwrap();
    let root = project(tmp.path());
    fs::create_dir_all(root.join("src/pages/Foo/list")).unwrap();

    let err = run(&config(&root, "foo", TemplateName::ListPage)).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(fs::read_to_string(root.join("config/config.ts")).unwrap(), UMI_CONFIG);
}

#[test]
fn unsafe_page_names_are_rejected_before_any_write() {
    for name in ["../x", "a/b", "o'brien", "../../escaped"] {
        let tmp = TempDir::new().unwrap();
        let root = project(tmp.path());

        let err = run(&config(&root, name, TemplateName::ListPage)).unwrap_err();

        assert!(matches!(err, Error::Validation(_)), "{name}: {err}");
        assert_eq!(fs::read_dir(root.join("src/pages")).unwrap().count(), 0, "{name}");
        assert_eq!(fs::read_dir(&root).unwrap().count(), 2, "{name}");
        assert_eq!(fs::read_to_string(root.join("config/config.ts")).unwrap(), UMI_CONFIG);
    }
}

#[test]
fn route_file_with_quoted_text_still_parses_after_injection() {
    let tmp = TempDir::new().unwrap();
    let root = project(tmp.path());
    fs::write(
        root.join("config/config.ts"),
        "export default defineConfig({ title: 'say \"hi\"', routes: [] });\n",
    )
    .unwrap();

    run(&config(&root, "foo", TemplateName::ListPage)).unwrap();

    let routes = fs::read_to_string(root.join("config/config.ts")).unwrap();
    assert!(routes.contains(r#"'say "hi"'"#), "{routes}");
    assert!(routes.contains("'/aps/Foo'"), "{routes}");
    assert!(parse_source(Path::new("config.ts"), routes).is_ok());
}
