use criterion::{black_box, criterion_group, criterion_main, Criterion};
use member_admin::data::record::{Record, RecordId};
use member_admin::data::view_filter::filter_indices;
use member_admin::table_view::{TableSettings, TableView};

fn create_members(rows: usize) -> Vec<Record> {
    let roles = ["member", "admin", "owner", "viewer"];

    (0..rows as u64)
        .map(|i| {
            Record::new(i + 1)
                .with_field("name", format!("Member {}", i))
                .with_field("email", format!("member{}@mailinator.com", i))
                .with_field("role", roles[i as usize % roles.len()])
        })
        .collect()
}

fn benchmark_filter(c: &mut Criterion) {
    let members_10k = create_members(10_000);
    let members_100k = create_members(100_000);

    let mut group = c.benchmark_group("filter");

    group.bench_function("10k_rows", |b| {
        b.iter(|| filter_indices(&members_10k, black_box("ADMIN")));
    });

    group.bench_function("100k_rows", |b| {
        b.iter(|| filter_indices(&members_100k, black_box("ADMIN")));
    });

    group.bench_function("100k_rows_no_match", |b| {
        b.iter(|| filter_indices(&members_100k, black_box("nobody-by-this-name")));
    });

    group.finish();
}

fn benchmark_table_actions(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_view");

    // one keystroke in the search box: refilter + reset page
    group.bench_function("set_query_50k", |b| {
        let mut view = TableView::with_records(TableSettings::default(), create_members(50_000));
        let mut toggle = false;
        b.iter(|| {
            toggle = !toggle;
            view.set_query(if toggle { "member 4" } else { "member 42" });
            black_box(view.page_rows().len());
        });
    });

    // delete refilters and clamps the page
    group.bench_function("delete_one_50k", |b| {
        let mut view = TableView::with_records(TableSettings::default(), create_members(50_000));
        let mut next = 1u64;
        b.iter(|| {
            let pending = view.request_delete(RecordId(next));
            if let Some(pending) = pending {
                view.resolve_delete(&pending, true);
            }
            next += 1;
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_filter, benchmark_table_actions);
criterion_main!(benches);
