use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use witfields_core::config::EngineConfig;
use witfields_core::field::allowed_values::{self, AllowedValuesCollection};
use witfields_core::field::storage::{BaseType, StorageType};
use witfields_core::field::{FieldDefinition, FieldUsage};
use witfields_core::metadata::{
    ConstantRecord, ConstantSetEntry, FieldRecord, Metadata, MetadataSnapshot, RuleFlags,
    RuleRecord,
};
use witfields_core::value::ValueType;
use witfields_core::WitContext;

const FIELD_ID: i32 = 10_001;
const ROOT_SET: i32 = 1_000_000;

#[derive(Clone, Copy, Debug)]
struct Tier {
    name: &'static str,
    groups: i32,
    members: i32,
}

const TIERS: [Tier; 3] = [
    Tier {
        name: "S",
        groups: 10,
        members: 20,
    },
    Tier {
        name: "M",
        groups: 50,
        members: 100,
    },
    Tier {
        name: "L",
        groups: 200,
        members: 250,
    },
];

/// One root set of `groups` subsets with `members` leaves each, plus a
/// suggestion rule per traversal shape.
fn snapshot(tier: Tier) -> MetadataSnapshot {
    let mut constants = vec![ConstantRecord {
        id: ROOT_SET,
        string: "Root".into(),
        display_name: None,
        is_identity: false,
    }];
    let mut constant_sets = Vec::new();
    for g in 0..tier.groups {
        let group = ROOT_SET + 1 + g;
        constants.push(ConstantRecord {
            id: group,
            string: format!("Group {g}"),
            display_name: None,
            is_identity: false,
        });
        constant_sets.push(ConstantSetEntry {
            parent: ROOT_SET,
            child: group,
        });
        for m in 0..tier.members {
            let id = g * tier.members + m;
            constants.push(ConstantRecord {
                id,
                string: format!("Value {id}"),
                display_name: None,
                is_identity: false,
            });
            constant_sets.push(ConstantSetEntry {
                parent: group,
                child: id,
            });
        }
    }

    let shapes = [
        RuleFlags::THEN_TWO_PLUS_LEVELS | RuleFlags::THEN_LEAF,
        RuleFlags::THEN_ONE_LEVEL | RuleFlags::THEN_INTERIOR,
        RuleFlags::empty(),
    ];
    let rules = shapes
        .iter()
        .zip(1..)
        .map(|(shape, id)| RuleRecord {
            id,
            then_field: FIELD_ID,
            then_const: ROOT_SET,
            flags: RuleFlags::SUGGESTION | *shape,
        })
        .collect();

    MetadataSnapshot {
        fields: vec![FieldRecord {
            id: FIELD_ID,
            name: "Category".into(),
            reference_name: "Custom.Category".into(),
            storage_type: StorageType::new(BaseType::String, 0),
            usage: FieldUsage::WorkItem,
            supports_text_query: false,
        }],
        constants,
        constant_sets,
        rules,
        ..MetadataSnapshot::default()
    }
}

fn bench_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("allowed_values.compute");

    for tier in TIERS {
        let snapshot = snapshot(tier);
        let metadata = Metadata::new(snapshot.clone());
        let definition = FieldDefinition::new(&snapshot.fields[0], None);
        let values = allowed_values::compute(&metadata, &definition).unwrap_or_default();
        group.throughput(Throughput::Elements(values.len() as u64));

        group.bench_with_input(BenchmarkId::new("populate", tier.name), &tier, |b, _| {
            b.iter(|| black_box(allowed_values::compute(&metadata, &definition)));
        });

        group.bench_with_input(BenchmarkId::new("sort", tier.name), &values, |b, values| {
            b.iter(|| {
                black_box(AllowedValuesCollection::new(
                    values.iter().cloned(),
                    ValueType::String,
                    true,
                ))
            });
        });
    }

    group.finish();
}

fn bench_cached(c: &mut Criterion) {
    let ctx = WitContext::new(snapshot(TIERS[1]), EngineConfig::default()).expect("bench metadata");
    let definition = ctx.registry().require(FIELD_ID).expect("bench field");
    black_box(ctx.allowed_values(&definition));

    c.bench_function("allowed_values.cached_lookup", |b| {
        b.iter(|| black_box(ctx.allowed_values(&definition)));
    });
}

criterion_group!(benches, bench_compute, bench_cached);
criterion_main!(benches);
