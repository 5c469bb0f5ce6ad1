//! Background resync scheduler.
//!
//! Registers one recurring job at server startup that resyncs every tenant.
//! Job state lives only in memory; a restart simply waits for the next tick.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Every six hours, on the hour.
const RESYNC_SCHEDULE: &str = "0 0 */6 * * *";

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process; dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<shoplens_core::AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let pool = Arc::new(pool);
    let job = Job::new_async(RESYNC_SCHEDULE, move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);

        Box::pin(async move {
            tracing::info!("scheduler: starting tenant resync run");
            run_resync_job(&pool, &config).await;
            tracing::info!("scheduler: tenant resync run complete");
        })
    })?;
    scheduler.add(job).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Resyncs every tenant in turn. One tenant's failure is logged and does not
/// stop the loop; the rest of the tenants still get their pass.
async fn run_resync_job(pool: &PgPool, config: &shoplens_core::AppConfig) {
    let tenants = match shoplens_db::list_tenants(pool).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to list tenants");
            return;
        }
    };

    if tenants.is_empty() {
        tracing::info!("scheduler: no tenants onboarded; skipping");
        return;
    }

    for tenant in &tenants {
        match shoplens_sync::sync_tenant_by_id(pool, config, tenant.public_id).await {
            Ok(outcome) => {
                tracing::info!(
                    tenant = %tenant.public_id,
                    customers = outcome.customers,
                    orders = outcome.orders,
                    products = outcome.products,
                    "scheduler: tenant resync succeeded"
                );
            }
            Err(e) => {
                tracing::error!(
                    tenant = %tenant.public_id,
                    error = %e,
                    "scheduler: tenant resync failed"
                );
            }
        }
    }
}
