use release_core::db::open_db_in_memory;
use release_core::resource::{format_project_name, format_release_name, format_sheet_name};
use release_core::{
    CreateReleaseRequest, ErrorKind, FieldMask, ListReleasesRequest, Project, ProjectRepository,
    Release, ReleaseFile, ReleaseFileType, ReleaseService, ReleaseServiceConfig, ReleaseState,
    Sheet, SheetRepository, SqliteStore, UpdateReleaseRequest, User, UserRepository, VcsSource,
    VcsType,
};
use rusqlite::Connection;
use std::collections::HashSet;

struct Seed {
    project: Project,
    user: User,
    sheet: Sheet,
}

fn seed(conn: &Connection) -> Seed {
    let store = SqliteStore::try_new(conn).unwrap();
    let project = store.create_project("p1", "Project One").unwrap();
    let user = store.create_user("dev@example.com").unwrap();
    let sheet = store
        .create_sheet(project.uid, "CREATE TABLE t (id INT);")
        .unwrap();
    Seed {
        project,
        user,
        sheet,
    }
}

fn service(conn: &Connection) -> ReleaseService<SqliteStore<'_>> {
    ReleaseService::new(SqliteStore::try_new(conn).unwrap())
}

fn file_for(sheet: &Sheet, name: &str, version: &str) -> ReleaseFile {
    ReleaseFile {
        name: name.to_string(),
        sheet: format_sheet_name("p1", sheet.uid),
        file_type: ReleaseFileType::Versioned,
        version: version.to_string(),
        ..ReleaseFile::default()
    }
}

fn create_request(release: Release) -> CreateReleaseRequest {
    CreateReleaseRequest {
        parent: format_project_name("p1"),
        release: Some(release),
    }
}

fn create_simple(
    service: &ReleaseService<SqliteStore<'_>>,
    seed: &Seed,
    title: &str,
) -> Release {
    let files = vec![file_for(&seed.sheet, "0001_init.sql", "0001")];
    service
        .create_release(&seed.user, &create_request(Release::draft(title, files)))
        .unwrap()
}

fn list_request(
    page_size: i32,
    page_token: Option<String>,
    show_deleted: bool,
) -> ListReleasesRequest {
    ListReleasesRequest {
        parent: format_project_name("p1"),
        page_size,
        page_token,
        show_deleted,
    }
}

fn title_update(name: &str, title: &str, paths: &[&str]) -> UpdateReleaseRequest {
    let mut release = Release::draft(title, Vec::new());
    release.name = name.to_string();
    UpdateReleaseRequest {
        release,
        update_mask: Some(FieldMask::new(paths.iter().copied())),
    }
}

#[test]
fn create_release_freezes_checksum_and_formats_name() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = service(&conn);

    let mut draft = Release::draft(
        "first release",
        vec![file_for(&seed.sheet, "0001_init.sql", "0001")],
    );
    draft.vcs_source = Some(VcsSource {
        vcs_type: VcsType::GitLab,
        pull_request_url: "https://gitlab.com/acme/db/-/merge_requests/3".to_string(),
    });
    let created = service
        .create_release(&seed.user, &create_request(draft.clone()))
        .unwrap();

    let uid = created
        .name
        .strip_prefix("projects/p1/releases/")
        .expect("release name should be scoped to project")
        .parse::<i64>()
        .expect("release uid should be numeric");
    assert_eq!(created.name, format_release_name("p1", uid));
    assert_eq!(created.title, "first release");
    assert_eq!(created.state, ReleaseState::Active);
    assert_eq!(created.creator, "users/dev@example.com");
    assert!(created.create_time > 0);
    assert_eq!(created.vcs_source, draft.vcs_source);

    let file = &created.files[0];
    assert_eq!(file.sheet_sha256, seed.sheet.sha256);
    assert_eq!(file.statement, "CREATE TABLE t (id INT);");
    assert_eq!(file.statement_size, seed.sheet.size);
    assert_eq!(file.file_type, ReleaseFileType::Versioned);
    assert_eq!(file.version, "0001");
}

#[test]
fn create_release_ignores_caller_supplied_checksum() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = service(&conn);

    let mut file = file_for(&seed.sheet, "0001_init.sql", "0001");
    file.sheet_sha256 = "forged".to_string();
    let created = service
        .create_release(&seed.user, &create_request(Release::draft("r", vec![file])))
        .unwrap();

    assert_eq!(created.files[0].sheet_sha256, seed.sheet.sha256);
}

#[test]
fn create_release_preserves_file_order() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let store = SqliteStore::try_new(&conn).unwrap();
    let second = store
        .create_sheet(seed.project.uid, "ALTER TABLE t ADD c INT;")
        .unwrap();
    let service = service(&conn);

    let files = vec![
        file_for(&second, "0003_alter.sql", "0003"),
        file_for(&seed.sheet, "0001_init.sql", "0001"),
        file_for(&second, "0002_again.sql", "0002"),
    ];
    let created = service
        .create_release(&seed.user, &create_request(Release::draft("ordered", files)))
        .unwrap();

    let names: Vec<&str> = created.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["0003_alter.sql", "0001_init.sql", "0002_again.sql"]);
    assert_eq!(created.files[0].sheet_sha256, second.sha256);
    assert_eq!(created.files[1].sheet_sha256, seed.sheet.sha256);
}

#[test]
fn create_release_without_files_is_valid() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = service(&conn);

    let created = service
        .create_release(&seed.user, &create_request(Release::draft("empty", Vec::new())))
        .unwrap();
    assert!(created.files.is_empty());
    assert_eq!(created.vcs_source, None);
}

#[test]
fn create_release_validates_request() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = service(&conn);

    let missing_body = CreateReleaseRequest {
        parent: format_project_name("p1"),
        release: None,
    };
    let err = service.create_release(&seed.user, &missing_body).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let bad_parent = CreateReleaseRequest {
        parent: "p1".to_string(),
        release: Some(Release::draft("x", Vec::new())),
    };
    let err = service.create_release(&seed.user, &bad_parent).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let unknown_project = CreateReleaseRequest {
        parent: format_project_name("nope"),
        release: Some(Release::draft("x", Vec::new())),
    };
    let err = service
        .create_release(&seed.user, &unknown_project)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains("nope"));
}

#[test]
fn create_release_with_bad_sheet_reference_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = service(&conn);

    let mut missing = file_for(&seed.sheet, "0002_missing.sql", "0002");
    missing.sheet = format_sheet_name("p1", seed.sheet.uid + 100);
    let files = vec![file_for(&seed.sheet, "0001_init.sql", "0001"), missing];
    let err = service
        .create_release(&seed.user, &create_request(Release::draft("bad", files)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let mut malformed = file_for(&seed.sheet, "0001_init.sql", "0001");
    malformed.sheet = "sheets/1".to_string();
    let err = service
        .create_release(
            &seed.user,
            &create_request(Release::draft("bad", vec![malformed])),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let listed = service.list_releases(&list_request(10, None, true)).unwrap();
    assert!(listed.releases.is_empty());
}

#[test]
fn get_release_reports_frozen_checksum_with_live_statement() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = service(&conn);
    let created = create_simple(&service, &seed, "snapshot");

    let store = SqliteStore::try_new(&conn).unwrap();
    let changed = store
        .update_sheet_statement(seed.sheet.uid, "CREATE TABLE t (id BIGINT);")
        .unwrap();
    assert_ne!(changed.sha256, seed.sheet.sha256);

    let loaded = service.get_release(&created.name).unwrap();
    let file = &loaded.files[0];
    assert_eq!(file.sheet_sha256, seed.sheet.sha256);
    assert_eq!(file.statement, "CREATE TABLE t (id BIGINT);");
    assert_eq!(file.statement_size, changed.size);
}

#[test]
fn get_release_errors() {
    let conn = open_db_in_memory().unwrap();
    let _seed = seed(&conn);
    let service = service(&conn);

    let err = service
        .get_release(&format_release_name("p1", 999))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    for name in ["projects/p1/releases/abc", "projects/p1", "releases/1", ""] {
        let err = service.get_release(name).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument, "name `{name}`");
    }
}

#[test]
fn list_releases_pages_through_all_records() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = service(&conn);
    let created: Vec<String> = (0..5)
        .map(|i| create_simple(&service, &seed, &format!("r{i}")).name)
        .collect();

    let mut seen = Vec::new();
    let mut token = None;
    let mut pages = 0;
    loop {
        let page = service.list_releases(&list_request(2, token, false)).unwrap();
        pages += 1;
        assert!(page.releases.len() <= 2);
        seen.extend(page.releases.into_iter().map(|release| release.name));
        match page.next_page_token {
            Some(next) => {
                assert!(!next.is_empty());
                token = Some(next);
            }
            None => break,
        }
    }

    assert_eq!(pages, 3);
    let newest_first: Vec<String> = created.into_iter().rev().collect();
    assert_eq!(seen, newest_first);
}

#[test]
fn list_releases_has_more_detection() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = service(&conn);
    for i in 0..3 {
        create_simple(&service, &seed, &format!("r{i}"));
    }

    let exact = service.list_releases(&list_request(3, None, false)).unwrap();
    assert_eq!(exact.releases.len(), 3);
    assert_eq!(exact.next_page_token, None);

    let one_short = service.list_releases(&list_request(2, None, false)).unwrap();
    assert_eq!(one_short.releases.len(), 2);
    assert!(one_short.next_page_token.is_some());

    let larger = service.list_releases(&list_request(10, None, false)).unwrap();
    assert_eq!(larger.releases.len(), 3);
    assert_eq!(larger.next_page_token, None);
}

#[test]
fn list_releases_applies_default_page_size() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = ReleaseService::with_config(
        SqliteStore::try_new(&conn).unwrap(),
        ReleaseServiceConfig {
            default_page_size: 2,
        },
    );
    for i in 0..3 {
        create_simple(&service, &seed, &format!("r{i}"));
    }

    let page = service.list_releases(&list_request(0, None, false)).unwrap();
    assert_eq!(page.releases.len(), 2);
    assert!(page.next_page_token.is_some());
}

#[test]
fn list_releases_with_zero_default_page_size_still_advances() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = ReleaseService::with_config(
        SqliteStore::try_new(&conn).unwrap(),
        ReleaseServiceConfig {
            default_page_size: 0,
        },
    );
    for i in 0..3 {
        create_simple(&service, &seed, &format!("r{i}"));
    }

    let page = service.list_releases(&list_request(0, None, false)).unwrap();
    assert_eq!(page.releases.len(), 3);
    assert_eq!(page.next_page_token, None);

    // A zero-limit token must not pin the cursor in place.
    let stuck = release_core::encode_page_token(0, 0);
    let mut token = Some(stuck.clone());
    let mut seen = 0;
    for _ in 0..5 {
        let page = service
            .list_releases(&list_request(0, token.clone(), false))
            .unwrap();
        seen += page.releases.len();
        assert_ne!(page.next_page_token.as_deref(), Some(stuck.as_str()));
        token = page.next_page_token;
        if token.is_none() {
            break;
        }
    }
    assert_eq!(seen, 3);
    assert_eq!(token, None);
}

#[test]
fn list_releases_validates_request() {
    let conn = open_db_in_memory().unwrap();
    let _seed = seed(&conn);
    let service = service(&conn);

    let err = service
        .list_releases(&list_request(-1, None, false))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = service
        .list_releases(&list_request(10, Some("garbage!!".to_string()), false))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let mut unknown = list_request(10, None, false);
    unknown.parent = format_project_name("nope");
    let err = service.list_releases(&unknown).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn list_releases_is_scoped_to_parent_project() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let store = SqliteStore::try_new(&conn).unwrap();
    store.create_project("p2", "Project Two").unwrap();
    let service = service(&conn);
    create_simple(&service, &seed, "in p1");

    let mut other = list_request(10, None, true);
    other.parent = format_project_name("p2");
    let listed = service.list_releases(&other).unwrap();
    assert!(listed.releases.is_empty());
    assert_eq!(listed.next_page_token, None);
}

#[test]
fn delete_and_undelete_drive_state_and_listing() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = service(&conn);
    let created = create_simple(&service, &seed, "lifecycle");

    service.delete_release(&created.name).unwrap();
    let deleted = service.get_release(&created.name).unwrap();
    assert_eq!(deleted.state, ReleaseState::Deleted);

    let hidden = service.list_releases(&list_request(10, None, false)).unwrap();
    assert!(hidden.releases.is_empty());
    let shown = service.list_releases(&list_request(10, None, true)).unwrap();
    let names: HashSet<String> = shown.releases.into_iter().map(|r| r.name).collect();
    assert!(names.contains(&created.name));

    let restored = service.undelete_release(&created.name).unwrap();
    assert_eq!(restored.state, ReleaseState::Active);
    assert_eq!(restored.title, "lifecycle");
    assert_eq!(restored.files, created.files);

    let visible = service.list_releases(&list_request(10, None, false)).unwrap();
    assert_eq!(visible.releases.len(), 1);
}

#[test]
fn delete_and_undelete_are_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = service(&conn);
    let created = create_simple(&service, &seed, "twice");

    let restored = service.undelete_release(&created.name).unwrap();
    assert_eq!(restored.state, ReleaseState::Active);

    service.delete_release(&created.name).unwrap();
    service.delete_release(&created.name).unwrap();
    assert_eq!(
        service.get_release(&created.name).unwrap().state,
        ReleaseState::Deleted
    );
}

#[test]
fn delete_and_undelete_errors() {
    let conn = open_db_in_memory().unwrap();
    let _seed = seed(&conn);
    let service = service(&conn);
    let missing = format_release_name("p1", 404);

    assert_eq!(
        service.delete_release(&missing).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        service.undelete_release(&missing).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        service.delete_release("projects/p1/releases/").unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
}

#[test]
fn update_title_leaves_other_fields_untouched() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = service(&conn);
    let mut draft = Release::draft("before", vec![file_for(&seed.sheet, "a.sql", "0001")]);
    draft.vcs_source = Some(VcsSource {
        vcs_type: VcsType::GitHub,
        pull_request_url: "https://github.com/acme/db/pull/1".to_string(),
    });
    let created = service
        .create_release(&seed.user, &create_request(draft))
        .unwrap();

    let mut request = title_update(&created.name, "after", &["title"]);
    request.release.files = Vec::new();
    request.release.vcs_source = None;
    let updated = service.update_release(&request).unwrap();

    assert_eq!(updated.title, "after");
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.files, created.files);
    assert_eq!(updated.vcs_source, created.vcs_source);
    assert_eq!(updated.state, ReleaseState::Active);
    assert_eq!(updated.create_time, created.create_time);
    assert_eq!(service.get_release(&created.name).unwrap().title, "after");
}

#[test]
fn update_without_title_path_keeps_title() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = service(&conn);
    let created = create_simple(&service, &seed, "stable");

    for paths in [&[][..], &["files", "vcs_source", "state"][..]] {
        let updated = service
            .update_release(&title_update(&created.name, "ignored", paths))
            .unwrap();
        assert_eq!(updated.title, "stable");
        assert_eq!(updated.files, created.files);
    }
}

#[test]
fn update_rejects_deleted_release_and_missing_mask() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = service(&conn);
    let created = create_simple(&service, &seed, "frozen");

    let mut no_mask = title_update(&created.name, "x", &["title"]);
    no_mask.update_mask = None;
    assert_eq!(
        service.update_release(&no_mask).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );

    service.delete_release(&created.name).unwrap();
    for paths in [&["title"][..], &[][..], &["files"][..]] {
        let err = service
            .update_release(&title_update(&created.name, "x", paths))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FailedPrecondition);
    }
    assert_eq!(service.get_release(&created.name).unwrap().title, "frozen");

    let err = service
        .update_release(&title_update(&format_release_name("p1", 777), "x", &["title"]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn release_with_vanished_sheet_is_internal_error() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = service(&conn);
    let created = create_simple(&service, &seed, "orphan");

    conn.execute("DELETE FROM sheets WHERE uid = ?1;", [seed.sheet.uid])
        .unwrap();

    let err = service.get_release(&created.name).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    let err = service
        .list_releases(&list_request(10, None, false))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
}

#[test]
fn release_with_vanished_creator_is_internal_error() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = service(&conn);
    let created = create_simple(&service, &seed, "orphan");

    conn.execute_batch("PRAGMA foreign_keys = OFF;").unwrap();
    conn.execute("DELETE FROM principals WHERE uid = ?1;", [seed.user.uid])
        .unwrap();

    let err = service.get_release(&created.name).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(err.to_string().contains("creator"));
    let err = service
        .list_releases(&list_request(10, None, false))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
}

#[test]
fn release_with_vanished_project_is_internal_error() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = service(&conn);
    let created = create_simple(&service, &seed, "orphan");

    conn.execute_batch("PRAGMA foreign_keys = OFF;").unwrap();
    conn.execute("DELETE FROM projects WHERE uid = ?1;", [seed.project.uid])
        .unwrap();

    let err = service.get_release(&created.name).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(err.to_string().contains("project"));
}

#[test]
fn end_to_end_release_lifecycle() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = service(&conn);

    let created = create_simple(&service, &seed, "e2e");
    assert_eq!(created.state, ReleaseState::Active);
    assert_eq!(created.files[0].sheet_sha256, seed.sheet.sha256);
    assert!(created.name.starts_with("projects/p1/releases/"));

    service.delete_release(&created.name).unwrap();
    assert_eq!(
        service.get_release(&created.name).unwrap().state,
        ReleaseState::Deleted
    );
    assert!(service
        .list_releases(&list_request(0, None, false))
        .unwrap()
        .releases
        .is_empty());
    assert_eq!(
        service
            .list_releases(&list_request(0, None, true))
            .unwrap()
            .releases
            .len(),
        1
    );

    let restored = service.undelete_release(&created.name).unwrap();
    assert_eq!(restored.state, ReleaseState::Active);
}
