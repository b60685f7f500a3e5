//! MongoDB data layer for the monetization workflow.
//!
//! Every read-modify-write sequence (payout recording, live-test join, batch
//! earnings writes, settlement) runs inside a single `ClientSession`
//! transaction; concurrent transactions touching the same document are
//! retried or aborted by the database, not by application code.

use crate::models::{
    Earnings, EarningsUpdate, LiveTest, LiveTestStatus, MockTest, MonetizationStatus, PayoutRecord,
    TestAnalytics, TestResult, User, Winning,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, to_bson, DateTime};
use mongodb::options::{IndexOptions, ReplaceOptions, UpdateOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use rust_decimal::Decimal;
use service_core::error::AppError;

#[derive(Clone)]
pub struct MonetizationRepository {
    client: Client,
    users: Collection<User>,
    mock_tests: Collection<MockTest>,
    analytics: Collection<TestAnalytics>,
    earnings: Collection<Earnings>,
    live_tests: Collection<LiveTest>,
    test_results: Collection<TestResult>,
    winnings: Collection<Winning>,
}

impl MonetizationRepository {
    pub fn new(client: Client, db: &Database) -> Self {
        Self {
            client,
            users: db.collection("users"),
            mock_tests: db.collection("mock_tests"),
            analytics: db.collection("test_analytics"),
            earnings: db.collection("earnings"),
            live_tests: db.collection("live_tests"),
            test_results: db.collection("test_results"),
            winnings: db.collection("winnings"),
        }
    }

    /// Initialize database indexes for creator-scoped queries.
    pub async fn init_indexes(&self) -> Result<(), AppError> {
        let creator_analytics_index = IndexModel::builder()
            .keys(doc! { "created_by": 1 })
            .options(
                IndexOptions::builder()
                    .name("creator_analytics_idx".to_string())
                    .build(),
            )
            .build();
        self.analytics
            .create_indexes([creator_analytics_index], None)
            .await?;

        let creator_tests_index = IndexModel::builder()
            .keys(doc! { "created_by": 1 })
            .options(
                IndexOptions::builder()
                    .name("creator_tests_idx".to_string())
                    .build(),
            )
            .build();
        self.mock_tests
            .create_indexes([creator_tests_index], None)
            .await?;

        let status_index = IndexModel::builder()
            .keys(doc! { "monetization_status": 1 })
            .options(
                IndexOptions::builder()
                    .name("monetization_status_idx".to_string())
                    .build(),
            )
            .build();
        self.users.create_indexes([status_index], None).await?;

        let results_index = IndexModel::builder()
            .keys(doc! { "test_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("test_results_idx".to_string())
                    .build(),
            )
            .build();
        self.test_results
            .create_indexes([results_index], None)
            .await?;

        // The settlement idempotency key: one winnings entry per user per event.
        let winnings_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "live_test_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_live_test_winnings_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.winnings.create_indexes([winnings_index], None).await?;

        tracing::info!("Monetization service indexes initialized");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Users / monetization status
    // -------------------------------------------------------------------------

    pub async fn find_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let user = self.users.find_one(doc! { "_id": user_id }, None).await?;
        Ok(user)
    }

    pub async fn set_monetization_status(
        &self,
        user_id: &str,
        status: MonetizationStatus,
    ) -> Result<(), AppError> {
        self.users
            .update_one(
                doc! { "_id": user_id },
                doc! {
                    "$set": {
                        "monetization_status": status.as_str(),
                        "updated_at": DateTime::now()
                    }
                },
                None,
            )
            .await?;
        Ok(())
    }

    pub async fn list_approved_creators(&self) -> Result<Vec<User>, AppError> {
        let cursor = self
            .users
            .find(
                doc! { "monetization_status": MonetizationStatus::Approved.as_str() },
                None,
            )
            .await?;
        let creators: Vec<User> = cursor.try_collect().await?;
        Ok(creators)
    }

    pub async fn count_tests_created(&self, user_id: &str) -> Result<u64, AppError> {
        let count = self
            .mock_tests
            .count_documents(doc! { "created_by": user_id }, None)
            .await?;
        Ok(count)
    }

    pub async fn find_test(&self, test_id: &str) -> Result<Option<MockTest>, AppError> {
        let test = self
            .mock_tests
            .find_one(doc! { "_id": test_id }, None)
            .await?;
        Ok(test)
    }

    // -------------------------------------------------------------------------
    // Analytics aggregator
    // -------------------------------------------------------------------------

    /// Increment the impression counter, creating the analytics document if
    /// the test has never been tracked before.
    pub async fn record_impression(&self, test_id: &str) -> Result<(), AppError> {
        let test = self
            .find_test(test_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Test not found")))?;

        self.analytics
            .update_one(
                doc! { "_id": test_id },
                doc! {
                    "$inc": { "impression_count": 1 },
                    "$setOnInsert": {
                        "created_by": test.created_by,
                        "unique_takers": []
                    }
                },
                UpdateOptions::builder().upsert(true).build(),
            )
            .await?;
        Ok(())
    }

    /// Add a taker to the test's unique-taker set. `$addToSet` gives the set
    /// semantics: retakes never inflate the count.
    pub async fn record_submission(&self, test_id: &str, user_id: &str) -> Result<(), AppError> {
        let test = self
            .find_test(test_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Test not found")))?;

        self.analytics
            .update_one(
                doc! { "_id": test_id },
                doc! {
                    "$addToSet": { "unique_takers": user_id },
                    "$setOnInsert": {
                        "created_by": test.created_by,
                        "impression_count": 0
                    }
                },
                UpdateOptions::builder().upsert(true).build(),
            )
            .await?;
        Ok(())
    }

    /// Sum unique-taker counts across all of a creator's analytics documents.
    pub async fn total_unique_takers(&self, user_id: &str) -> Result<u64, AppError> {
        let cursor = self
            .analytics
            .find(doc! { "created_by": user_id }, None)
            .await?;
        let docs: Vec<TestAnalytics> = cursor.try_collect().await?;
        Ok(docs.iter().map(TestAnalytics::unique_taker_count).sum())
    }

    // -------------------------------------------------------------------------
    // Earnings ledger
    // -------------------------------------------------------------------------

    pub async fn get_earnings(&self, user_id: &str) -> Result<Option<Earnings>, AppError> {
        let earnings = self
            .earnings
            .find_one(doc! { "_id": user_id }, None)
            .await?;
        Ok(earnings)
    }

    /// Commit a calculator cycle as one atomic multi-document write.
    ///
    /// Only the derived fields are set; `paid_amount` and `payment_history`
    /// belong to the payout recorder and are seeded solely on first insert.
    pub async fn apply_earnings_updates(&self, updates: &[EarningsUpdate]) -> Result<(), AppError> {
        if updates.is_empty() {
            return Ok(());
        }

        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        for update in updates {
            let breakdown = &update.breakdown;
            self.earnings
                .update_one_with_session(
                    doc! { "_id": &update.user_id },
                    doc! {
                        "$set": {
                            "total_earnings": to_bson(&breakdown.total_earnings)?,
                            "platform_fees": to_bson(&breakdown.platform_fees)?,
                            "net_earnings": to_bson(&breakdown.net_earnings)?,
                            "pending_amount": to_bson(&breakdown.pending_amount)?,
                            "updated_at": DateTime::now()
                        },
                        "$setOnInsert": {
                            "paid_amount": to_bson(&Decimal::ZERO)?,
                            "payment_history": []
                        }
                    },
                    UpdateOptions::builder().upsert(true).build(),
                    &mut session,
                )
                .await?;
        }

        session.commit_transaction().await?;
        Ok(())
    }

    /// Record a disbursement inside a single read-modify-write transaction.
    ///
    /// Fails with `NotFound` when no earnings document exists yet: a creator
    /// who has never been through a calculator run cannot be paid out.
    pub async fn record_payout(
        &self,
        user_id: &str,
        amount: Decimal,
        transaction_id: Option<String>,
    ) -> Result<PayoutRecord, AppError> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        let found = self
            .earnings
            .find_one_with_session(doc! { "_id": user_id }, None, &mut session)
            .await?;
        let earnings = Earnings::require_existing(found, user_id)?;

        let (new_paid, new_pending, record) = earnings.apply_payout(amount, transaction_id);

        self.earnings
            .update_one_with_session(
                doc! { "_id": user_id },
                doc! {
                    "$set": {
                        "paid_amount": to_bson(&new_paid)?,
                        "pending_amount": to_bson(&new_pending)?,
                        "updated_at": DateTime::now()
                    },
                    "$push": { "payment_history": to_bson(&record)? }
                },
                None,
                &mut session,
            )
            .await?;

        session.commit_transaction().await?;

        tracing::info!(
            user_id = %user_id,
            amount = %record.amount,
            transaction_id = %record.transaction_id,
            "Payout recorded"
        );

        Ok(record)
    }

    // -------------------------------------------------------------------------
    // Live tests
    // -------------------------------------------------------------------------

    pub async fn find_live_test(&self, live_test_id: &str) -> Result<Option<LiveTest>, AppError> {
        let live_test = self
            .live_tests
            .find_one(doc! { "_id": live_test_id }, None)
            .await?;
        Ok(live_test)
    }

    /// Register a paid participant and collect their entry fee into the pot,
    /// atomically.
    pub async fn join_live_test(&self, live_test_id: &str, user_id: &str) -> Result<(), AppError> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        let live_test = self
            .live_tests
            .find_one_with_session(doc! { "_id": live_test_id }, None, &mut session)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Live test not found")))?;

        if live_test.status == LiveTestStatus::Completed {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Live test has already completed"
            )));
        }
        if live_test.participants.iter().any(|p| p == user_id) {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Already joined this live test"
            )));
        }

        let new_pot = live_test.pot + live_test.entry_fee;
        self.live_tests
            .update_one_with_session(
                doc! { "_id": live_test_id },
                doc! {
                    "$addToSet": { "participants": user_id },
                    "$set": {
                        "pot": to_bson(&new_pot)?,
                        "updated_at": DateTime::now()
                    }
                },
                None,
                &mut session,
            )
            .await?;

        session.commit_transaction().await?;
        Ok(())
    }

    pub async fn list_results(&self, test_id: &str) -> Result<Vec<TestResult>, AppError> {
        let cursor = self
            .test_results
            .find(doc! { "test_id": test_id }, None)
            .await?;
        let results: Vec<TestResult> = cursor.try_collect().await?;
        Ok(results)
    }

    /// Write the winners' prizes and mark the live test completed in one
    /// transaction. Each winning is upserted on `(user_id, live_test_id)`, so
    /// re-running settlement overwrites previous entries.
    pub async fn settle_live_test(
        &self,
        live_test_id: &str,
        winners: &[Winning],
    ) -> Result<(), AppError> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        for winning in winners {
            self.winnings
                .replace_one_with_session(
                    doc! {
                        "user_id": &winning.user_id,
                        "live_test_id": live_test_id
                    },
                    winning,
                    ReplaceOptions::builder().upsert(true).build(),
                    &mut session,
                )
                .await?;
        }

        self.live_tests
            .update_one_with_session(
                doc! { "_id": live_test_id },
                doc! {
                    "$set": {
                        "status": "completed",
                        "updated_at": DateTime::now()
                    }
                },
                None,
                &mut session,
            )
            .await?;

        session.commit_transaction().await?;
        Ok(())
    }
}
