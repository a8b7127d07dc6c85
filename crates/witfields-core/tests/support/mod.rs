//! Shared fixtures: a two-project server with core fields, a few custom
//! fields, constants and rules.

#![allow(dead_code)]

use std::sync::Arc;

use witfields_core::config::EngineConfig;
use witfields_core::core_fields::{self, names, node_types};
use witfields_core::field::FieldUsage;
use witfields_core::field::storage::{
    BaseType, StorageType, SUBTYPE_HISTORY, SUBTYPE_PERSON, SUBTYPE_TREE_ID, SUBTYPE_TREE_PATH,
};
use witfields_core::links::{Attachment, Link, LinkKind};
use witfields_core::metadata::{
    ConstantRecord, ConstantSetEntry, FieldRecord, MetadataSnapshot, NodeRecord, RuleFlags,
    RuleRecord,
};
use witfields_core::work_item::WorkItemRecord;
use witfields_core::{WitContext, WorkItem};

pub const PROJECT_X: i32 = 1;
pub const TEAM_A: i32 = 2;
pub const TEAM_A_SUB: i32 = 3;
pub const SPRINT_1: i32 = 4;
pub const PROJECT_Y: i32 = 10;
pub const BACKEND: i32 = 11;
pub const SPRINT_9: i32 = 12;

pub const PRIORITY: i32 = 10_001;
pub const DUE_DATE: i32 = 10_002;
pub const EFFORT: i32 = 10_003;
pub const PRIORITY_REF: &str = "Microsoft.VSTS.Common.Priority";

pub const ALICE: i32 = 500;
pub const BOB: i32 = 501;

const STATES: i32 = 2_000;
const STATE_GROUPS: i32 = 2_001;

fn field(id: i32, name: &str, reference_name: &str, storage_type: StorageType) -> FieldRecord {
    FieldRecord {
        id,
        name: name.into(),
        reference_name: reference_name.into(),
        storage_type,
        usage: FieldUsage::WorkItem,
        supports_text_query: false,
    }
}

fn st(base: BaseType) -> StorageType {
    StorageType::new(base, 0)
}

fn node(id: i32, name: &str, parent: Option<i32>, type_id: i32) -> NodeRecord {
    NodeRecord {
        id,
        name: name.into(),
        parent,
        type_id,
    }
}

fn constant(id: i32, string: &str) -> ConstantRecord {
    ConstantRecord {
        id,
        string: string.into(),
        display_name: None,
        is_identity: false,
    }
}

fn person(id: i32, account: &str, display: &str) -> ConstantRecord {
    ConstantRecord {
        id,
        string: account.into(),
        display_name: Some(display.into()),
        is_identity: true,
    }
}

fn rule(id: i32, then_field: i32, then_const: i32, flags: RuleFlags) -> RuleRecord {
    RuleRecord {
        id,
        then_field,
        then_const,
        flags,
    }
}

#[must_use]
pub fn snapshot() -> MetadataSnapshot {
    let fields = vec![
        field(core_fields::ID, "ID", names::ID, st(BaseType::Integer).readonly()),
        field(core_fields::TITLE, "Title", names::TITLE, st(BaseType::String)),
        field(core_fields::STATE, "State", names::STATE, st(BaseType::String)),
        field(core_fields::REASON, "Reason", names::REASON, st(BaseType::String)),
        field(
            core_fields::ASSIGNED_TO,
            "Assigned To",
            names::ASSIGNED_TO,
            StorageType::new(BaseType::String, SUBTYPE_PERSON),
        ),
        field(
            core_fields::WORK_ITEM_TYPE,
            "Work Item Type",
            names::WORK_ITEM_TYPE,
            st(BaseType::String),
        ),
        field(core_fields::CREATED_BY, "Created By", names::CREATED_BY, st(BaseType::String)),
        field(
            core_fields::HISTORY,
            "History",
            names::HISTORY,
            StorageType::new(BaseType::LongText, SUBTYPE_HISTORY),
        ),
        field(
            core_fields::AREA_ID,
            "Area ID",
            names::AREA_ID,
            StorageType::new(BaseType::Integer, SUBTYPE_TREE_ID),
        ),
        field(
            core_fields::AREA_PATH,
            "Area Path",
            names::AREA_PATH,
            StorageType::new(BaseType::String, SUBTYPE_TREE_PATH).readonly(),
        ),
        field(
            core_fields::ITERATION_ID,
            "Iteration ID",
            names::ITERATION_ID,
            StorageType::new(BaseType::Integer, SUBTYPE_TREE_ID),
        ),
        field(
            core_fields::ITERATION_PATH,
            "Iteration Path",
            names::ITERATION_PATH,
            StorageType::new(BaseType::String, SUBTYPE_TREE_PATH).readonly(),
        ),
        field(core_fields::NODE_NAME, "Node Name", names::NODE_NAME, st(BaseType::String).readonly()),
        field(core_fields::NODE_TYPE, "Node Type", names::NODE_TYPE, st(BaseType::Integer).readonly()),
        field(
            core_fields::TEAM_PROJECT,
            "Team Project",
            names::TEAM_PROJECT,
            st(BaseType::TreeNode).readonly(),
        ),
        field(core_fields::PERSON_ID, "Person ID", names::PERSON_ID, st(BaseType::Integer)),
        field(
            core_fields::AUTHORIZED_AS,
            "Authorized As",
            names::AUTHORIZED_AS,
            StorageType::new(BaseType::String, SUBTYPE_PERSON).readonly(),
        ),
        field(
            core_fields::HYPERLINK_COUNT,
            "Hyperlink Count",
            names::HYPERLINK_COUNT,
            st(BaseType::Integer).readonly(),
        ),
        field(
            core_fields::RELATED_LINK_COUNT,
            "Related Link Count",
            names::RELATED_LINK_COUNT,
            st(BaseType::Integer).readonly(),
        ),
        field(
            core_fields::ATTACHED_FILE_COUNT,
            "Attached File Count",
            names::ATTACHED_FILE_COUNT,
            st(BaseType::Integer).readonly(),
        ),
        field(PRIORITY, "Priority", PRIORITY_REF, st(BaseType::Integer)),
        field(DUE_DATE, "Due Date", "Microsoft.VSTS.Scheduling.DueDate", st(BaseType::DateTime)),
        field(EFFORT, "Effort", "Custom.Effort", st(BaseType::Double)),
    ];

    let nodes = vec![
        node(PROJECT_X, "ProjectX", None, node_types::PROJECT),
        node(TEAM_A, "TeamA", Some(PROJECT_X), node_types::AREA),
        node(TEAM_A_SUB, "Sub", Some(TEAM_A), node_types::AREA),
        node(SPRINT_1, "Sprint 1", Some(PROJECT_X), node_types::ITERATION),
        node(PROJECT_Y, "ProjectY", None, node_types::PROJECT),
        node(BACKEND, "Backend", Some(PROJECT_Y), node_types::AREA),
        node(SPRINT_9, "Sprint 9", Some(PROJECT_Y), node_types::ITERATION),
    ];

    let constants = vec![
        person(ALICE, "alice", "Alice Smith"),
        person(BOB, "bob", "Bob Jones"),
        constant(1_000, "Active"),
        constant(1_001, "Resolved"),
        constant(1_002, "Closed"),
        constant(1_010, "3"),
        constant(1_011, "10"),
        constant(1_012, "1"),
        constant(1_013, "2"),
        constant(1_020, "Fixed"),
        constant(1_021, "Ignored"),
        constant(STATES, "Allowed States"),
        constant(STATE_GROUPS, "State Groups"),
    ];

    let constant_sets = vec![
        ConstantSetEntry { parent: STATE_GROUPS, child: STATES },
        ConstantSetEntry { parent: STATES, child: 1_000 },
        ConstantSetEntry { parent: STATES, child: 1_001 },
        ConstantSetEntry { parent: STATES, child: 1_002 },
    ];

    let suggest = RuleFlags::SUGGESTION;
    let rules = vec![
        rule(
            1,
            core_fields::STATE,
            STATE_GROUPS,
            suggest | RuleFlags::THEN_TWO_PLUS_LEVELS | RuleFlags::THEN_LEAF,
        ),
        rule(2, PRIORITY, 1_010, suggest),
        rule(3, PRIORITY, 1_011, suggest),
        rule(4, PRIORITY, 1_012, suggest),
        rule(5, PRIORITY, 1_013, suggest),
        rule(6, core_fields::REASON, 1_020, RuleFlags::DENY_WRITE | RuleFlags::UNLESS),
        rule(
            7,
            core_fields::REASON,
            1_021,
            RuleFlags::DENY_WRITE | RuleFlags::UNLESS | RuleFlags::THEN_NOT,
        ),
        rule(8, core_fields::REASON, -10, RuleFlags::DENY_WRITE | RuleFlags::THEN_NOT),
    ];

    MetadataSnapshot {
        fields,
        nodes,
        constants,
        constant_sets,
        rules,
        ..MetadataSnapshot::default()
    }
}

#[must_use]
pub fn context_with(config: EngineConfig) -> Arc<WitContext> {
    Arc::new(WitContext::new(snapshot(), config).expect("fixture metadata is valid"))
}

#[must_use]
pub fn context() -> Arc<WitContext> {
    context_with(EngineConfig::default())
}

/// Server rows of work item 42 in `ProjectX\TeamA`.
#[must_use]
pub fn saved_record() -> WorkItemRecord {
    let mut record = WorkItemRecord::default();
    for (key, value) in [
        (names::ID, "42"),
        (names::TITLE, "Login fails on retry"),
        (names::STATE, "Active"),
        (names::WORK_ITEM_TYPE, "Bug"),
        (names::AREA_ID, "2"),
        (names::ITERATION_ID, "4"),
        (names::PERSON_ID, "500"),
        (PRIORITY_REF, "2"),
    ] {
        record.fields.insert(key.into(), value.into());
    }
    record.links = vec![
        Link {
            kind: LinkKind::Related,
            target: "41".into(),
        },
        Link {
            kind: LinkKind::Hyperlink,
            target: "https://example.com/login".into(),
        },
    ];
    record.attachments = vec![Attachment {
        name: "trace.log".into(),
        length: 2_048,
    }];
    record
}

#[must_use]
pub fn saved_item(ctx: &Arc<WitContext>) -> WorkItem {
    WorkItem::from_server(Arc::clone(ctx), &saved_record()).expect("fixture item loads")
}
