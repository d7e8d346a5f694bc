//! HandlerDeps wires every component to the same ledger

use pretty_assertions::assert_eq;
use refbot::telegram::HandlerDeps;
use refcore::storage::create_pool;
use refcore::{AdminList, LedgerStore, ProgramRules, SqliteLedger, SubmitOutcome};
use std::sync::Arc;

fn deps() -> (tempfile::TempDir, HandlerDeps) {
    let dir = tempfile::tempdir().unwrap();
    let pool = create_pool(dir.path().join("bot.sqlite").to_str().unwrap()).unwrap();
    let ledger: Arc<dyn LedgerStore> = Arc::new(SqliteLedger::new(Arc::new(pool)));
    let deps = HandlerDeps::new(
        ledger,
        ProgramRules::default(),
        AdminList::new([42]),
        Some("hallaym_bot".to_string()),
    );
    (dir, deps)
}

#[tokio::test]
async fn components_share_one_ledger() {
    let (_dir, deps) = deps();

    for newcomer in 2..=13 {
        assert!(deps.referrals.attribute(newcomer, 1).await.unwrap());
    }
    assert_eq!(deps.ledger.get_or_create(1).await.unwrap().balance, 12_000);

    deps.workflow.begin(1).await.unwrap();
    deps.workflow.submit(1, "8600 1234 5678 9012").await.unwrap();
    let created = deps.workflow.submit(1, "12000").await.unwrap();
    assert!(matches!(created, SubmitOutcome::Created { balance_after: 0, .. }));

    let outcome = deps.adjudicator.reject(42, 1, 12_000).await.unwrap();
    assert!(outcome.applied);
    assert_eq!(deps.ledger.get_or_create(1).await.unwrap().balance, 12_000);
}

#[tokio::test]
async fn admin_list_is_passed_through() {
    let (_dir, deps) = deps();
    assert!(deps.admins().is_admin(42));
    assert!(!deps.admins().is_admin(1));
    assert_eq!(deps.bot_username.as_deref(), Some("hallaym_bot"));
}
