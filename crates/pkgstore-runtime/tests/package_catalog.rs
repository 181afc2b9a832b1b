//! PkgCatalog against a temporary sources directory and `sh` stand-ins for
//! the package manager.

#![cfg(unix)]

use std::fs;
use std::sync::Arc;

use pkgstore_core::{
    CoreError, FeaturedCatalog, PackageCatalogPort, PackageDescriptor, StoreSettings,
};
use pkgstore_runtime::PkgCatalog;
use tempfile::TempDir;

fn catalog(settings: StoreSettings) -> PkgCatalog {
    let featured = FeaturedCatalog::new(vec![PackageDescriptor::new("git", "Dev")]);
    PkgCatalog::new(Arc::new(settings), featured)
}

fn sh_settings() -> StoreSettings {
    StoreSettings {
        shell: "sh".to_string(),
        shell_flag: "-c".to_string(),
        ..StoreSettings::default()
    }
}

#[tokio::test]
async fn featured_is_served_from_memory() {
    let packages = catalog(sh_settings()).featured().await.unwrap();
    assert_eq!(packages, [PackageDescriptor::new("git", "Dev")]);
}

#[tokio::test]
async fn repos_strip_extension_and_sort() {
    let dir = TempDir::new().unwrap();
    for file in ["x11.list", "root.list", "sources.list.bak", "main.sources"] {
        fs::write(dir.path().join(file), "deb https://example.invalid stable main\n").unwrap();
    }

    let settings = StoreSettings {
        sources_dir: dir.path().to_path_buf(),
        ..sh_settings()
    };
    let repos = catalog(settings).repos().await.unwrap();
    assert_eq!(repos, ["root", "x11"]);
}

#[tokio::test]
async fn missing_sources_dir_means_no_repos() {
    let dir = TempDir::new().unwrap();
    let settings = StoreSettings {
        sources_dir: dir.path().join("does-not-exist"),
        ..sh_settings()
    };
    assert!(catalog(settings).repos().await.unwrap().is_empty());
}

#[tokio::test]
async fn installed_parses_list_output() {
    let settings = StoreSettings {
        list_installed_command:
            "printf 'Listing...\\nhtop/stable,now 3.3.0 [installed]\\nvim/stable 9.1 [installed]\\n'"
                .to_string(),
        ..sh_settings()
    };
    let installed = catalog(settings).installed().await.unwrap();
    assert_eq!(installed, ["Listing...", "htop", "vim"]);
}

#[tokio::test]
async fn available_is_sorted_and_categorised() {
    let settings = StoreSettings {
        list_available_command: "printf 'vim\\npython\\nx\\nopenssh\\n'".to_string(),
        ..sh_settings()
    };
    let packages = catalog(settings).available().await.unwrap();
    assert_eq!(
        packages,
        [
            PackageDescriptor::new("openssh", "Network"),
            PackageDescriptor::new("python", "Dev"),
            PackageDescriptor::new("vim", "Editors"),
        ]
    );
}

#[tokio::test]
async fn unavailable_shell_is_an_external_service_error() {
    let settings = StoreSettings {
        shell: "/nonexistent/pkgstore-shell".to_string(),
        ..sh_settings()
    };
    let err = catalog(settings).installed().await.unwrap_err();
    assert!(matches!(err, CoreError::ExternalService(_)));
}
