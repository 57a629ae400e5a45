//! Cross-session analytics on top of the session manager: the progress
//! rollup, windowed reports, learning paths, milestones, and comparisons.

use prep_core::model::{
    milestone_catalog, AnalyticsPeriod, LearningPath, MilestoneStatus, ProgressAnalytics,
    SessionComparison, SessionId, UserId, UserProgress,
};

use crate::error::SessionManagerError;
use crate::sessions::SessionManager;

impl SessionManager {
    /// The user's progress rollup, computed lazily from the full session
    /// history on first access and cached in-process afterwards. Completing a
    /// session replaces the cached value wholesale.
    ///
    /// # Errors
    ///
    /// Returns storage errors.
    pub async fn get_user_progress(
        &self,
        user_id: UserId,
    ) -> Result<UserProgress, SessionManagerError> {
        if let Some(progress) = self.progress_cache().get(&user_id).cloned() {
            return Ok(progress);
        }
        self.refresh_user_progress(user_id).await
    }

    /// Recomputes the rollup from scratch, refreshes the cache, and writes it
    /// through to storage.
    ///
    /// The rescan is linear in the user's session history; acceptable at this
    /// scale, and the repository split keeps an incremental rollup a contained
    /// change later.
    ///
    /// # Errors
    ///
    /// Returns storage errors.
    pub(crate) async fn refresh_user_progress(
        &self,
        user_id: UserId,
    ) -> Result<UserProgress, SessionManagerError> {
        let sessions = self.sessions_repo().list_sessions_for_user(user_id).await?;
        let progress = UserProgress::from_sessions(user_id, &sessions, self.clock().now());

        self.progress_repo().upsert_progress(&progress).await?;
        self.progress_cache().insert(user_id, progress.clone());

        tracing::debug!(
            %user_id,
            completed = progress.completed_sessions,
            "progress rollup refreshed"
        );
        Ok(progress)
    }

    /// Point-in-time report over the completed sessions inside the window.
    ///
    /// # Errors
    ///
    /// Returns storage errors.
    pub async fn get_progress_analytics(
        &self,
        user_id: UserId,
        period: AnalyticsPeriod,
    ) -> Result<ProgressAnalytics, SessionManagerError> {
        let sessions = self.sessions_repo().list_sessions_for_user(user_id).await?;
        Ok(ProgressAnalytics::compute(
            user_id,
            period,
            &sessions,
            self.clock().now(),
        ))
    }

    /// Generates the recommendation bundle from the current progress.
    ///
    /// # Errors
    ///
    /// Returns storage errors.
    pub async fn generate_learning_path(
        &self,
        user_id: UserId,
    ) -> Result<LearningPath, SessionManagerError> {
        let progress = self.get_user_progress(user_id).await?;
        Ok(LearningPath::from_progress(&progress))
    }

    /// Evaluates the milestone catalog against the current progress.
    ///
    /// `achieved_at` is stamped the first time a milestone reads as achieved
    /// within this process; it is a best-effort signal, not a durable
    /// first-occurrence record.
    ///
    /// # Errors
    ///
    /// Returns storage errors.
    pub async fn get_milestones(
        &self,
        user_id: UserId,
    ) -> Result<Vec<MilestoneStatus>, SessionManagerError> {
        let progress = self.get_user_progress(user_id).await?;
        let now = self.clock().now();

        let mut history = self.milestone_history();
        let statuses = milestone_catalog()
            .iter()
            .map(|def| {
                let achieved = def.current_value(&progress) >= def.threshold;
                let stamped = if achieved {
                    Some(*history.entry((user_id, def.id)).or_insert(now))
                } else {
                    history.get(&(user_id, def.id)).copied()
                };
                def.evaluate(&progress, stamped)
            })
            .collect();
        Ok(statuses)
    }

    /// Pairwise diff between two sessions of the same user. Rejected outright
    /// when the sessions belong to different users.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound`, cross-tenant comparison errors, and storage
    /// errors.
    pub async fn compare_sessions(
        &self,
        first: SessionId,
        second: SessionId,
    ) -> Result<SessionComparison, SessionManagerError> {
        let first_session = self.load(first).await?;
        let second_session = self.load(second).await?;
        Ok(SessionComparison::compute(&first_session, &second_session)?)
    }
}
