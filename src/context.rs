//! Application context built once at startup.
//!
//! Holds the read-only state every operation works against: configuration,
//! the chat index, the customer table, the classifier (or the reason it is
//! missing), and the credential store. Handlers receive it through an `Arc`;
//! nothing here is mutated after construction except the users file, which
//! [`UserStore`] guards itself.

use anyhow::Result;
use std::sync::Arc;

use churnwise_core::classifier::Classifier;
use churnwise_core::index::DocumentIndex;
use churnwise_core::models::Document;
use churnwise_core::table::Table;

use crate::auth::UserStore;
use crate::config::Config;
use crate::data;

pub enum ModelStatus {
    Loaded(Box<dyn Classifier>),
    Unavailable(String),
}

impl ModelStatus {
    pub fn classifier(&self) -> Option<&dyn Classifier> {
        match self {
            ModelStatus::Loaded(m) => Some(m.as_ref()),
            ModelStatus::Unavailable(_) => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelStatus::Loaded(_))
    }

    /// Why the model is unavailable, if it is.
    pub fn reason(&self) -> Option<&str> {
        match self {
            ModelStatus::Loaded(_) => None,
            ModelStatus::Unavailable(r) => Some(r.as_str()),
        }
    }
}

pub struct AppContext {
    pub config: Arc<Config>,
    pub index: DocumentIndex,
    pub customers: Table,
    pub model: ModelStatus,
    pub users: UserStore,
}

impl AppContext {
    /// Load every input named in `config`.
    ///
    /// The customer dataset is mandatory. A missing or invalid corpus leaves
    /// chat answering with the fallback message; a missing or invalid model
    /// leaves the service up with predictions reported as unavailable.
    pub fn load(config: &Config) -> Result<Self> {
        let customers = data::load_table(&config.data.customers_csv, config.data.drop_incomplete_rows)?;
        tracing::info!(
            rows = customers.len(),
            path = %config.data.customers_csv.display(),
            "Loaded customer data"
        );

        let documents = match data::load_documents(&config.data.documents_json) {
            Ok(docs) => docs,
            Err(e) => {
                tracing::warn!("Chat corpus unavailable, answering with fallback: {:#}", e);
                Vec::new()
            }
        };

        let model = match data::load_model(&config.data.model_path) {
            Ok(artifact) => {
                tracing::info!(
                    kind = artifact.kind(),
                    features = artifact.feature_names().len(),
                    path = %config.data.model_path.display(),
                    "Loaded model"
                );
                ModelStatus::Loaded(Box::new(artifact))
            }
            Err(e) => {
                tracing::error!("Model not loaded: {:#}", e);
                ModelStatus::Unavailable(format!("Model is not loaded: {:#}", e))
            }
        };

        Ok(Self::from_parts(config.clone(), customers, documents, model))
    }

    /// Assemble a context from already-loaded parts.
    pub fn from_parts(
        config: Config,
        customers: Table,
        documents: Vec<Document>,
        model: ModelStatus,
    ) -> Self {
        let supplied = documents.len();
        let index = DocumentIndex::build(documents);
        if index.len() < supplied {
            tracing::warn!(
                skipped = supplied - index.len(),
                "Duplicate document ids in chat corpus; kept first occurrence"
            );
        }
        tracing::info!(
            documents = index.len(),
            terms = index.vocabulary_size(),
            "Built chat index"
        );

        let users = UserStore::new(config.data.users_csv.clone());
        Self {
            config: Arc::new(config),
            index,
            customers,
            model,
            users,
        }
    }
}
