//! Patient document operations.

use carebridge_core::{DocumentId, ProfileId};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::client::PharmacistClient;
use crate::error::PharmacistError;

/// Which face of a card the scan shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSide {
    Front,
    Back,
}

/// Document category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "provincialHealthCard")]
    ProvincialHealthCard,
    #[serde(rename = "governmentId")]
    GovernmentId,
    #[serde(rename = "InsuranceProvider-Primary")]
    InsuranceProviderPrimary,
    #[serde(rename = "InsuranceProvider-Secondary")]
    InsuranceProviderSecondary,
    #[serde(rename = "InsuranceProvider-Tertiary")]
    InsuranceProviderTertiary,
    #[serde(rename = "additional")]
    Additional,
}

/// A document attached to a patient profile, referencing an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDocument {
    /// Name returned by [`PharmacistClient::upload_file`].
    pub file_name: String,
    pub side: DocumentSide,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
}

impl PharmacistClient {
    /// Attach a document to a patient.
    ///
    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self, document), fields(profile_id = %profile_id))]
    pub async fn create_document(
        &self,
        document: &PatientDocument,
        profile_id: &ProfileId,
    ) -> Result<Value, PharmacistError> {
        self.guard()
            .run(|| async {
                let url = self.url(&["pharmacist", "profiles", profile_id.as_str(), "documents"])?;
                let request = self.request(Method::POST, url).await?.json(document);
                self.send_data(request).await
            })
            .await
    }

    /// Replace a patient document.
    ///
    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self, document), fields(profile_id = %profile_id, document_id = %document_id))]
    pub async fn update_document(
        &self,
        document_id: &DocumentId,
        document: &PatientDocument,
        profile_id: &ProfileId,
    ) -> Result<Value, PharmacistError> {
        self.guard()
            .run(|| async {
                let url = self.url(&[
                    "pharmacist",
                    "profiles",
                    profile_id.as_str(),
                    "documents",
                    document_id.as_str(),
                ])?;
                let request = self.request(Method::PUT, url).await?.json(document);
                self.send_data(request).await
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self), fields(profile_id = %profile_id))]
    pub async fn list_documents(&self, profile_id: &ProfileId) -> Result<Value, PharmacistError> {
        self.guard()
            .run(|| async {
                let url = self.url(&["pharmacist", "profiles", profile_id.as_str(), "documents"])?;
                let request = self.request(Method::GET, url).await?;
                self.send_data(request).await
            })
            .await
    }
}
