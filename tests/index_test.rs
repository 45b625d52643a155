mod common;

use common::TestFixture;
use makefile_lsp::analysis::classifier::SPECIAL_TARGETS;
use makefile_lsp::{EntityKind, MakefileIndex};
use std::path::Path;

const PROJECT: &str = "\
CC := gcc
CFLAGS ?= -O2 \\
    -Wall

# link step
app: main.o util.o
\t$(CC) $(CFLAGS) -o app main.o util.o

define compile
\t$(CC) -c $(1)
endef

build: $(call compile,main.c)
echo $(CFLAGS) done
";

#[test]
fn test_outline_is_in_line_order() {
    let index = MakefileIndex::new();
    let entities = index.build_symbol_index(PROJECT, Path::new("/ws/Makefile"));

    let lines: Vec<u32> = entities.iter().map(|e| e.line()).collect();
    let mut sorted = lines.clone();
    sorted.sort();
    assert_eq!(lines, sorted);

    let summary: Vec<(&str, EntityKind, u32)> = entities
        .iter()
        .map(|e| (e.name(), e.kind(), e.line()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("CC", EntityKind::Variable, 0),
            ("CFLAGS", EntityKind::Variable, 1),
            ("app", EntityKind::Target, 5),
            ("compile", EntityKind::Function, 8),
            ("build", EntityKind::Target, 12),
            ("compile", EntityKind::FunctionCall, 12),
            ("CFLAGS", EntityKind::Reference, 13),
        ]
    );
}

#[test]
fn test_continuation_keeps_line_slots() {
    let index = MakefileIndex::new();
    let entities = index.build_symbol_index("A = 1 \\\nB\nC = 2\n", Path::new("/ws/Makefile"));

    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0].name(), "A");
    assert_eq!(entities[0].value(), "1 B");
    assert_eq!(entities[0].line(), 0);
    assert_eq!(entities[1].name(), "C");
    assert_eq!(entities[1].line(), 2);
}

#[test]
fn test_every_assignment_operator_yields_a_variable() {
    let index = MakefileIndex::new();
    for op in ["=", ":=", "::=", ":::=", "?="] {
        let line = format!("NAME{}  some value", op);
        let entities = index.build_symbol_index(&line, Path::new("/ws/Makefile"));
        assert_eq!(entities.len(), 1, "operator {}", op);
        assert_eq!(entities[0].name(), "NAME", "operator {}", op);
        assert_eq!(entities[0].kind(), EntityKind::Variable, "operator {}", op);
        assert_eq!(entities[0].value(), "some value", "operator {}", op);
    }
}

#[test]
fn test_special_targets_produce_no_entity() {
    let index = MakefileIndex::new();
    for name in SPECIAL_TARGETS {
        let content = format!("{}: all clean\n", name);
        let entities = index.build_symbol_index(&content, Path::new("/ws/Makefile"));
        assert!(entities.is_empty(), "{} produced {:?}", name, entities);
    }
}

#[test]
fn test_target_position() {
    let index = MakefileIndex::new();
    let entities = index.build_symbol_index("\n\ninstall: app\n", Path::new("/ws/Makefile"));
    assert_eq!(entities.len(), 1);

    let loc = entities[0].location();
    assert_eq!(loc.start_line, 2);
    assert_eq!(loc.start_column, 0);
    assert_eq!(loc.end_line, 2);
    assert_eq!(loc.end_column, 7);
}

#[test]
fn test_malformed_line_is_ignored() {
    let index = MakefileIndex::new();
    let entities = index.build_symbol_index("foo bar baz\n", Path::new("/ws/Makefile"));
    assert!(entities.is_empty());
}

#[test]
fn test_reindex_from_unchanged_disk_is_idempotent() {
    let fixture = TestFixture::new();
    let path = fixture.create_file("Makefile", PROJECT);

    fixture.index.ensure_indexed(&path, None).unwrap();
    let before = fixture.index.cache().get(&path).unwrap();

    fixture.index.invalidate_and_reindex(&path).unwrap();
    let after = fixture.index.cache().get(&path).unwrap();

    assert_eq!(before.entities(), after.entities());
    assert_eq!(fixture.index.cache().scan_count(), 2);
}

#[test]
fn test_save_replaces_stale_entities() {
    let fixture = TestFixture::new();
    let path = fixture.create_file("Makefile", "OLD := 1\n");
    fixture.index.ensure_indexed(&path, None).unwrap();

    fixture.create_file("Makefile", "NEW := 2\n");
    fixture.index.invalidate_and_reindex(&path).unwrap();

    assert!(fixture.index.resolve_definition(&path, "OLD").is_empty());
    assert_eq!(fixture.index.resolve_definition(&path, "NEW").len(), 1);
}

#[test]
fn test_deleted_file_loses_its_entry() {
    let fixture = TestFixture::new();
    let path = fixture.create_file("Makefile", "A := 1\n");
    fixture.index.ensure_indexed(&path, None).unwrap();
    assert!(fixture.index.is_indexed(&path));

    std::fs::remove_file(&path).unwrap();
    fixture.index.invalidate_and_reindex(&path).unwrap();
    assert!(!fixture.index.is_indexed(&path));
}

#[test]
fn test_missing_file_degrades_to_empty_results() {
    let fixture = TestFixture::new();
    let path = fixture.path("nope.mk");

    assert!(fixture.index.ensure_indexed(&path, None).is_ok());
    assert!(fixture.index.resolve_definition(&path, "A").is_empty());
    assert!(fixture.index.resolve_hover_value(&path, "A", 0).is_none());
    assert!(!fixture.index.is_indexed(&path));
}

#[test]
fn test_redefinitions_are_all_reported() {
    let index = MakefileIndex::new();
    let path = Path::new("/ws/Makefile");
    index
        .ensure_indexed(path, Some("X := 1\nX := 1\n"))
        .unwrap();

    let found = index.resolve_definition(path, "X");
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].start_line, 0);
    assert_eq!(found[1].start_line, 1);
}
