use chrono::{TimeDelta, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use std::sync::Arc;

use engine::{
    BalancePolicy, Division, EditWindow, Engine, EngineError, MAX_AMOUNT_MINOR, MAX_BALANCE_MINOR,
    Mutability, NewTransactionCmd, ReportWindow, TransactionKind, TransactionListFilter,
    TransactionPatch,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn connect() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

async fn engine_with_db(policy: BalancePolicy) -> (Engine, DatabaseConnection) {
    let db = connect().await;
    let engine = Engine::builder()
        .database(db.clone())
        .balance_policy(policy)
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn engine_with_file_db() -> (Engine, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("ledger_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    (engine, path)
}

async fn backdate(db: &DatabaseConnection, id: Uuid, age: TimeDelta) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE transactions SET created_at = ? WHERE id = ?",
        vec![(Utc::now() - age).into(), id.to_string().into()],
    ))
    .await
    .unwrap();
}

async fn balance(engine: &Engine, name: &str) -> i64 {
    engine.account(name).await.unwrap().balance_minor
}

#[tokio::test]
async fn income_then_expense_moves_balance() {
    let (engine, _db) = engine_with_db(BalancePolicy::AppendOnly).await;
    engine.new_account("Cash", 0).await.unwrap();

    engine
        .add_transaction(NewTransactionCmd::income("Cash", 1000, "Salary", "Salary"))
        .await
        .unwrap();
    engine
        .add_transaction(NewTransactionCmd::expense("Cash", 300, "Lunch", "Food"))
        .await
        .unwrap();

    assert_eq!(balance(&engine, "Cash").await, 700);
    assert_eq!(engine.transactions().await.unwrap().len(), 2);
}

#[tokio::test]
async fn transfer_materializes_missing_accounts() {
    let (engine, _db) = engine_with_db(BalancePolicy::AppendOnly).await;

    let tx = engine
        .add_transaction(NewTransactionCmd::transfer(
            "Wallet", "Savings", 200, "Move", "Transfer",
        ))
        .await
        .unwrap();

    assert_eq!(tx.kind, TransactionKind::Transfer);
    assert_eq!(balance(&engine, "Wallet").await, -200);
    assert_eq!(balance(&engine, "Savings").await, 200);

    let accounts = engine.accounts().await.unwrap();
    assert_eq!(accounts.len(), 2);
    assert!(accounts.iter().all(|a| a.opening_balance_minor == 0));
}

#[tokio::test]
async fn missing_source_uses_default_account() {
    let (engine, _db) = engine_with_db(BalancePolicy::AppendOnly).await;

    let tx = engine
        .add_transaction(NewTransactionCmd::new(
            TransactionKind::Expense,
            50,
            "Bus",
            "Transport",
        ))
        .await
        .unwrap();

    assert_eq!(tx.account_from, engine::DEFAULT_ACCOUNT);
    assert_eq!(balance(&engine, engine::DEFAULT_ACCOUNT).await, -50);
}

#[tokio::test]
async fn invalid_transaction_leaves_no_trace() {
    let (engine, _db) = engine_with_db(BalancePolicy::AppendOnly).await;

    let cmd = NewTransactionCmd::new(TransactionKind::Transfer, 200, "Move", "Transfer")
        .account_from("Wallet");
    let err = engine.add_transaction(cmd).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .add_transaction(NewTransactionCmd::expense("Wallet", -5, "Lunch", "Food"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    assert!(engine.transactions().await.unwrap().is_empty());
    assert!(engine.accounts().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_account_is_rejected() {
    let (engine, _db) = engine_with_db(BalancePolicy::AppendOnly).await;
    engine.new_account("Bank", 5000).await.unwrap();

    let err = engine.new_account("Bank", 10).await.unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("Bank".to_string()));

    let err = engine.new_account("   ", 10).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    assert_eq!(balance(&engine, "Bank").await, 5000);
}

#[tokio::test]
async fn unknown_keys_are_not_found() {
    let (engine, _db) = engine_with_db(BalancePolicy::AppendOnly).await;

    assert_eq!(
        engine.account("Nope").await.unwrap_err(),
        EngineError::KeyNotFound("account not exists".to_string())
    );
    let missing = Uuid::new_v4();
    assert_eq!(
        engine.transaction(missing).await.unwrap_err(),
        EngineError::KeyNotFound("transaction not exists".to_string())
    );
    assert!(matches!(
        engine
            .update_transaction(missing, TransactionPatch::new().amount_minor(1))
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.delete_transaction(missing).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(engine.account_history("Nope").await.unwrap().is_empty());
}

#[tokio::test]
async fn update_inside_window_succeeds() {
    let (engine, db) = engine_with_db(BalancePolicy::AppendOnly).await;
    let tx = engine
        .add_transaction(NewTransactionCmd::expense("Cash", 300, "Lunch", "Food"))
        .await
        .unwrap();
    backdate(&db, tx.id, TimeDelta::hours(11) + TimeDelta::minutes(59)).await;

    let updated = engine
        .update_transaction(tx.id, TransactionPatch::new().description("Dinner"))
        .await
        .unwrap();
    assert_eq!(updated.description, "Dinner");
    assert_eq!(updated.id, tx.id);
    assert_eq!(
        engine.transaction(tx.id).await.unwrap().description,
        "Dinner"
    );
    // append-only: balances only move on add
    assert_eq!(balance(&engine, "Cash").await, -300);
}

#[tokio::test]
async fn update_after_window_is_rejected() {
    let (engine, db) = engine_with_db(BalancePolicy::AppendOnly).await;
    let tx = engine
        .add_transaction(NewTransactionCmd::expense("Cash", 300, "Lunch", "Food"))
        .await
        .unwrap();
    backdate(&db, tx.id, TimeDelta::hours(12) + TimeDelta::minutes(1)).await;

    assert_eq!(
        engine.transaction_mutability(tx.id).await.unwrap(),
        Mutability::Locked
    );
    let err = engine
        .update_transaction(tx.id, TransactionPatch::new().amount_minor(10))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::EditWindowExpired { .. }));
    assert_eq!(engine.transaction(tx.id).await.unwrap().amount_minor, 300);

    // deletes are never time-boxed
    engine.delete_transaction(tx.id).await.unwrap();
    assert!(engine.transactions().await.unwrap().is_empty());
}

#[tokio::test]
async fn custom_edit_window_is_honoured() {
    let db = connect().await;
    let engine = Engine::builder()
        .database(db.clone())
        .edit_window(EditWindow::try_hours(1).unwrap())
        .build()
        .await
        .unwrap();
    let tx = engine
        .add_transaction(NewTransactionCmd::income("Cash", 10, "Tip", "Other"))
        .await
        .unwrap();
    assert_eq!(
        engine.transaction_mutability(tx.id).await.unwrap(),
        Mutability::Editable
    );

    backdate(&db, tx.id, TimeDelta::minutes(61)).await;
    assert!(matches!(
        engine
            .update_transaction(tx.id, TransactionPatch::new().note("late"))
            .await,
        Err(EngineError::EditWindowExpired { .. })
    ));
}

#[tokio::test]
async fn append_only_delete_keeps_balance() {
    let (engine, _db) = engine_with_db(BalancePolicy::AppendOnly).await;
    let tx = engine
        .add_transaction(NewTransactionCmd::expense("Cash", 300, "Lunch", "Food"))
        .await
        .unwrap();

    engine.delete_transaction(tx.id).await.unwrap();
    assert_eq!(balance(&engine, "Cash").await, -300);

    let drifts = engine.verify_balances().await.unwrap();
    assert_eq!(drifts.len(), 1);
    assert_eq!(drifts[0].account, "Cash");
    assert_eq!(drifts[0].stored_minor, Some(-300));
    assert_eq!(drifts[0].derived_minor, 0);
}

#[tokio::test]
async fn reconcile_delete_reverses_transfer() {
    let (engine, _db) = engine_with_db(BalancePolicy::Reconcile).await;
    engine.new_account("Cash", 1000).await.unwrap();
    let tx = engine
        .add_transaction(NewTransactionCmd::transfer("Cash", "Bank", 400, "Move", "Transfer"))
        .await
        .unwrap();
    assert_eq!(balance(&engine, "Cash").await, 600);
    assert_eq!(balance(&engine, "Bank").await, 400);

    engine.delete_transaction(tx.id).await.unwrap();
    assert_eq!(balance(&engine, "Cash").await, 1000);
    assert_eq!(balance(&engine, "Bank").await, 0);
    assert!(engine.verify_balances().await.unwrap().is_empty());
}

#[tokio::test]
async fn reconcile_update_moves_effect() {
    let (engine, _db) = engine_with_db(BalancePolicy::Reconcile).await;
    let tx = engine
        .add_transaction(NewTransactionCmd::expense("Cash", 300, "Lunch", "Food"))
        .await
        .unwrap();

    engine
        .update_transaction(
            tx.id,
            TransactionPatch::new().amount_minor(500).account_from("Card"),
        )
        .await
        .unwrap();

    assert_eq!(balance(&engine, "Cash").await, 0);
    assert_eq!(balance(&engine, "Card").await, -500);
    assert!(engine.verify_balances().await.unwrap().is_empty());
}

#[tokio::test]
async fn recompute_repairs_drift() {
    let (engine, db) = engine_with_db(BalancePolicy::AppendOnly).await;
    engine.new_account("Cash", 100).await.unwrap();
    engine
        .add_transaction(NewTransactionCmd::income("Cash", 900, "Pay", "Salary"))
        .await
        .unwrap();
    engine
        .add_transaction(NewTransactionCmd::transfer("Cash", "Bank", 250, "Move", "Transfer"))
        .await
        .unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_string(
        backend,
        "UPDATE accounts SET balance_minor = 1 WHERE name = 'Cash'",
    ))
    .await
    .unwrap();
    db.execute(Statement::from_string(
        backend,
        "DELETE FROM accounts WHERE name = 'Bank'",
    ))
    .await
    .unwrap();

    let drifts = engine.verify_balances().await.unwrap();
    assert_eq!(drifts.len(), 2);
    assert_eq!(drifts[0].account, "Bank");
    assert_eq!(drifts[0].stored_minor, None);

    let fixed = engine.recompute_balances().await.unwrap();
    assert_eq!(fixed, drifts);
    assert_eq!(balance(&engine, "Cash").await, 750);
    assert_eq!(balance(&engine, "Bank").await, 250);
    assert!(engine.verify_balances().await.unwrap().is_empty());
}

#[tokio::test]
async fn upsert_balance_delta_creates_then_increments() {
    let (engine, _db) = engine_with_db(BalancePolicy::AppendOnly).await;

    let account = engine.upsert_balance_delta("Jar", 40).await.unwrap();
    assert_eq!(account.balance_minor, 40);
    assert_eq!(account.opening_balance_minor, 0);

    let account = engine.upsert_balance_delta("Jar", -15).await.unwrap();
    assert_eq!(account.balance_minor, 25);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_deltas_are_not_lost() {
    let (engine, path) = engine_with_file_db().await;
    let engine = Arc::new(engine);

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..40 {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move {
            engine
                .add_transaction(NewTransactionCmd::income(
                    "Cash",
                    10,
                    format!("Tip {i}"),
                    "Other",
                ))
                .await
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }

    assert_eq!(balance(&engine, "Cash").await, 400);
    assert_eq!(engine.transactions().await.unwrap().len(), 40);
    assert!(engine.verify_balances().await.unwrap().is_empty());
    let _ = std::fs::remove_file(path);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_account_creates_yield_one_winner() {
    let (engine, path) = engine_with_file_db().await;
    let engine = Arc::new(engine);

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move { engine.new_account("Bank", 100).await });
    }

    let mut created = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert_eq!(err, EngineError::ExistingKey("Bank".to_string())),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(balance(&engine, "Bank").await, 100);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn amounts_are_bounded() {
    let (engine, _db) = engine_with_db(BalancePolicy::AppendOnly).await;

    engine
        .add_transaction(NewTransactionCmd::income("Cash", MAX_AMOUNT_MINOR, "Bonus", "Salary"))
        .await
        .unwrap();
    engine
        .add_transaction(NewTransactionCmd::income("Cash", MAX_AMOUNT_MINOR, "Bonus", "Salary"))
        .await
        .unwrap();
    assert_eq!(balance(&engine, "Cash").await, 2 * MAX_AMOUNT_MINOR);

    let err = engine
        .add_transaction(NewTransactionCmd::income(
            "Cash",
            i64::MAX / 2 + 1,
            "Jackpot",
            "Other",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(engine.transactions().await.unwrap().len(), 2);

    let report = engine.report(ReportWindow::All, Utc::now()).await.unwrap();
    assert_eq!(report.summary.income_minor, 2 * MAX_AMOUNT_MINOR);

    assert!(matches!(
        engine.upsert_balance_delta("Cash", MAX_AMOUNT_MINOR + 1).await,
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        engine.new_account("Huge", i64::MAX).await,
        Err(EngineError::Validation(_))
    ));
}

#[tokio::test]
async fn balance_overflow_rolls_back_the_add() {
    let (engine, _db) = engine_with_db(BalancePolicy::AppendOnly).await;
    engine
        .new_account("Reserve", MAX_BALANCE_MINOR - 10)
        .await
        .unwrap();

    let err = engine
        .add_transaction(NewTransactionCmd::transfer(
            "Cash", "Reserve", 100, "Top up", "Transfer",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AmountOverflow(_)));

    assert!(engine.transactions().await.unwrap().is_empty());
    assert_eq!(balance(&engine, "Reserve").await, MAX_BALANCE_MINOR - 10);
    assert!(matches!(
        engine.account("Cash").await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert_eq!(engine.accounts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn account_history_covers_both_sides() {
    let (engine, _db) = engine_with_db(BalancePolicy::AppendOnly).await;
    let now = Utc::now();
    engine
        .add_transaction(
            NewTransactionCmd::income("Cash", 100, "Pay", "Salary")
                .occurred_at(now - TimeDelta::days(2)),
        )
        .await
        .unwrap();
    engine
        .add_transaction(
            NewTransactionCmd::transfer("Bank", "Cash", 50, "Withdraw", "Transfer")
                .occurred_at(now - TimeDelta::days(1)),
        )
        .await
        .unwrap();
    engine
        .add_transaction(NewTransactionCmd::expense("Card", 10, "Snack", "Food"))
        .await
        .unwrap();

    let history = engine.account_history("Cash").await.unwrap();
    let descriptions: Vec<&str> = history.iter().map(|t| t.description.as_str()).collect();
    assert_eq!(descriptions, vec!["Withdraw", "Pay"]);
}

#[tokio::test]
async fn list_filters_and_reads_are_stable() {
    let (engine, _db) = engine_with_db(BalancePolicy::AppendOnly).await;
    engine
        .add_transaction(
            NewTransactionCmd::expense("Cash", 120, "Office coffee", "Food")
                .division(Division::Office),
        )
        .await
        .unwrap();
    engine
        .add_transaction(NewTransactionCmd::expense("Cash", 80, "Groceries", "Food"))
        .await
        .unwrap();
    engine
        .add_transaction(NewTransactionCmd::income("Cash", 1000, "Salary", "Salary"))
        .await
        .unwrap();

    let office = engine
        .list_transactions(&TransactionListFilter {
            division: Some(Division::Office),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(office.len(), 1);

    let coffee = engine
        .list_transactions(&TransactionListFilter {
            search: Some("COFFEE".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(coffee.len(), 1);

    let food = engine
        .list_transactions(&TransactionListFilter {
            kind: Some(TransactionKind::Expense),
            category: Some("Food".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(food.len(), 2);

    assert_eq!(
        engine.transactions().await.unwrap(),
        engine.transactions().await.unwrap()
    );
    assert_eq!(
        engine.accounts().await.unwrap(),
        engine.accounts().await.unwrap()
    );
}

#[tokio::test]
async fn report_reads_the_ledger() {
    let (engine, _db) = engine_with_db(BalancePolicy::AppendOnly).await;
    engine
        .add_transaction(NewTransactionCmd::income("Cash", 1000, "Salary", "Salary"))
        .await
        .unwrap();
    engine
        .add_transaction(NewTransactionCmd::expense("Cash", 300, "Lunch", "Food"))
        .await
        .unwrap();

    let report = engine.report(ReportWindow::All, Utc::now()).await.unwrap();
    assert_eq!(report.summary.balance_minor, 700);
    assert_eq!(report.summary.savings_rate, 70.0);
    assert_eq!(report.categories.len(), 1);
    assert_eq!(report.categories[0].category, "Food");
    assert_eq!(report.categories[0].percent, 100.0);
}
