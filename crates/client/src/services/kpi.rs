use pmflow_core::domain::kpi::{
    KpiActual, KpiActualUpdate, KpiDefinition, KpiId, KpiPerspective, KpiTarget, KpiTargetUpdate,
    PerspectiveId,
};
use pmflow_core::domain::submission::{EntryId, SubmissionId};
use serde::Serialize;

use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Serialize)]
struct TargetBatch<'a> {
    targets: &'a [KpiTargetUpdate],
}

#[derive(Serialize)]
struct ActualBatch<'a> {
    actuals: &'a [KpiActualUpdate],
}

#[derive(Clone)]
pub struct KpiDefinitionService {
    api: ApiClient,
}

impl KpiDefinitionService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get(&self, id: KpiId) -> Result<KpiDefinition, ApiError> {
        self.api.get(&format!("/kpi-definitions/{id}")).await
    }
}

#[derive(Clone)]
pub struct KpiTargetService {
    api: ApiClient,
}

impl KpiTargetService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn for_entry(
        &self,
        entry_id: EntryId,
        submission_id: SubmissionId,
    ) -> Result<Vec<KpiTarget>, ApiError> {
        self.api
            .get_query(
                &format!("/kpi-targets/entry/{}", entry_id.0),
                &[("submission_id", submission_id.0)],
            )
            .await
    }

    pub async fn bulk_update(&self, targets: &[KpiTargetUpdate]) -> Result<Vec<KpiTarget>, ApiError> {
        let saved: Vec<KpiTarget> =
            self.api.post("/kpi-targets/bulk-update", &TargetBatch { targets }).await?;
        self.api.notify_success(format!("{} targets saved", saved.len()));
        Ok(saved)
    }
}

#[derive(Clone)]
pub struct KpiActualService {
    api: ApiClient,
}

impl KpiActualService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn for_kpi_month(&self, kpi_id: KpiId, month: u8) -> Result<Vec<KpiActual>, ApiError> {
        self.api.get(&format!("/kpi-actuals/kpi/{kpi_id}/month/{month}")).await
    }

    pub async fn bulk_update(&self, actuals: &[KpiActualUpdate]) -> Result<Vec<KpiActual>, ApiError> {
        let saved: Vec<KpiActual> =
            self.api.post("/kpi-actuals/bulk-update", &ActualBatch { actuals }).await?;
        self.api.notify_success(format!("{} actuals saved", saved.len()));
        Ok(saved)
    }
}

#[derive(Clone)]
pub struct KpiPerspectiveService {
    api: ApiClient,
}

impl KpiPerspectiveService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<KpiPerspective>, ApiError> {
        self.api.get("/kpi-perspectives").await
    }

    pub async fn get(&self, id: PerspectiveId) -> Result<KpiPerspective, ApiError> {
        self.api.get(&format!("/kpi-perspectives/{}", id.0)).await
    }
}
