use backlog_rank::db::Database;
use backlog_rank::rank::RankError;
use speculate2::speculate;
use uuid::Uuid;

fn open_file_db(dir: &tempfile::TempDir) -> Database {
    let db = Database::open(dir.path().join("nested").join("ranks.db"))
        .expect("Failed to open database");
    db.migrate().expect("Failed to run migrations");
    db
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
        let ctx = Uuid::new_v4();
    }

    describe "entries" {
        it "records context and item on a new entry" {
            let item = Uuid::new_v4();
            db.rank_to_bottom(item, ctx).unwrap();

            let entries = db.list_entries(ctx).unwrap();
            assert_eq!(entries.len(), 1);
            assert!(entries[0].is_for(ctx, item));
            assert_eq!(entries[0].position, Some(0));
            assert!(!entries[0].id.is_nil());
        }

        it "keeps one entry per story and backlog" {
            let item = Uuid::new_v4();
            db.rank_to_bottom(item, ctx).unwrap();
            db.rank_to_head(item, ctx).unwrap();
            db.rank_to_bottom(item, ctx).unwrap();

            assert_eq!(db.list_entries(ctx).unwrap().len(), 1);
        }

        it "keeps the entry id across moves" {
            let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
            db.rank_to_bottom(a, ctx).unwrap();
            db.rank_to_bottom(b, ctx).unwrap();
            let original = db.list_entries(ctx).unwrap()[1].clone();

            db.rank_to_head(b, ctx).unwrap();

            let after = db.list_entries(ctx).unwrap()[0].clone();
            assert_eq!(after.id, original.id);
            assert_eq!(after.created_at, original.created_at);
            assert_eq!(after.position, Some(0));
        }

        it "reports no position for an unranked story" {
            assert_eq!(db.position_of(Uuid::new_v4(), ctx).unwrap(), None);
        }

        it "serializes entries as JSON" {
            let item = Uuid::new_v4();
            db.rank_to_bottom(item, ctx).unwrap();

            let json = serde_json::to_value(db.list_entries(ctx).unwrap()).unwrap();

            assert_eq!(json[0]["item_id"], item.to_string());
            assert_eq!(json[0]["context_id"], ctx.to_string());
            assert_eq!(json[0]["position"], 0);
        }
    }

    describe "transactions" {
        it "rolls back every write when an operation fails" {
            let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
            db.rank_to_bottom(a, ctx).unwrap();

            let result: Result<(), RankError> = db.with_ranker(|r| {
                r.rank_to_head(b, ctx)?;
                Err(RankError::storage("disk full"))
            });

            assert!(matches!(result, Err(RankError::Storage(_))));
            assert_eq!(db.list_ordered(ctx).unwrap(), vec![a]);
        }

        it "commits several operations as one unit" {
            let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

            db.with_ranker(|r| {
                r.rank_to_bottom(a, ctx)?;
                r.rank_to_head(b, ctx)
            })
            .unwrap();

            assert_eq!(db.list_ordered(ctx).unwrap(), vec![b, a]);
        }

        it "surfaces storage failures when the schema is missing" {
            let bare = Database::open_memory().unwrap();

            let err = bare.rank_to_bottom(Uuid::new_v4(), ctx).unwrap_err();

            assert!(matches!(err, RankError::Storage(_)));
            assert!(!err.is_invariant_violation());
        }
    }

    describe "file database" {
        it "persists ranks across reopen" {
            let dir = tempfile::tempdir().unwrap();
            let items: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
            {
                let db = open_file_db(&dir);
                for item in &items {
                    db.rank_to_head(*item, ctx).unwrap();
                }
            }

            let reopened = open_file_db(&dir);
            assert_eq!(
                reopened.list_ordered(ctx).unwrap(),
                vec![items[2], items[1], items[0]]
            );
        }
    }

    describe "concurrency" {
        it "keeps every backlog dense under parallel writers" {
            let shared = ctx;
            let backlogs: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

            std::thread::scope(|scope| {
                for own in &backlogs {
                    let db = db.clone();
                    scope.spawn(move || {
                        for i in 0..10 {
                            let item = Uuid::new_v4();
                            db.rank_to_head(item, *own).unwrap();
                            if i % 2 == 0 {
                                db.rank_to_bottom(item, shared).unwrap();
                            } else {
                                db.rank_to_head(item, shared).unwrap();
                            }
                        }
                    });
                }
            });

            for context in backlogs.iter().chain(std::iter::once(&shared)) {
                let positions: Vec<_> = db
                    .list_entries(*context)
                    .unwrap()
                    .into_iter()
                    .map(|e| e.position)
                    .collect();
                let expected: Vec<_> = (0..positions.len() as u32).map(Some).collect();
                assert_eq!(positions, expected);
            }
            assert_eq!(db.list_ordered(shared).unwrap().len(), 40);
        }
    }
}
