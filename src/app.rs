use crate::{
    config::{Config, ModelProvider},
    error::Result,
    ml::{
        Embedder, HashingEmbedder, HuggingFaceClient, HuggingFaceEmbedder,
        HuggingFaceSentimentClassifier, LexiconSentimentClassifier, SentimentClassifier,
    },
    models::Catalog,
    routes::{api_routes, json_config},
    services::{EmotionAnalyzer, RankingEngine, RecommendationService, SemanticScorer},
};
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::{info, warn};
use std::net::TcpListener;
use std::sync::Arc;

/// Sentiment and embedding backends selected by `ml.provider`.
pub fn build_models(
    config: &Config,
) -> Result<(Arc<dyn SentimentClassifier>, Arc<dyn Embedder>)> {
    match config.ml.provider {
        ModelProvider::HuggingFace => {
            let client = HuggingFaceClient::new(&config.huggingface)?;
            info!(
                "Using HuggingFace models: sentiment={}, embedding={}",
                config.huggingface.sentiment_model, config.huggingface.embedding_model
            );
            Ok((
                Arc::new(HuggingFaceSentimentClassifier::new(
                    client.clone(),
                    config.huggingface.sentiment_model.clone(),
                )),
                Arc::new(HuggingFaceEmbedder::new(
                    client,
                    config.huggingface.embedding_model.clone(),
                )),
            ))
        }
        ModelProvider::Offline => {
            info!("Using offline lexicon sentiment and hashing embeddings");
            Ok((
                Arc::new(LexiconSentimentClassifier::new()),
                Arc::new(HashingEmbedder::default()),
            ))
        }
    }
}

/// Wire the ranking pipeline around a catalog and a pair of model backends.
pub fn build_service(
    config: &Config,
    catalog: Arc<Catalog>,
    classifier: Arc<dyn SentimentClassifier>,
    embedder: Arc<dyn Embedder>,
) -> RecommendationService {
    let timeout = config.ml.timeout();
    let engine = RankingEngine::new(
        catalog.clone(),
        EmotionAnalyzer::new(classifier, timeout),
        SemanticScorer::new(
            embedder,
            catalog.clone(),
            timeout,
            config.ml.embedding_concurrency,
        ),
    );
    RecommendationService::new(catalog, engine)
}

/// Routes plus shared state; middleware is added by the server.
pub fn configure(
    recommendation_service: web::Data<RecommendationService>,
) -> impl Fn(&mut web::ServiceConfig) + Clone {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(recommendation_service.clone())
            .app_data(json_config())
            .configure(api_routes);
    }
}

pub struct Application {
    port: u16,
    host: String,
    precompute_embeddings: bool,
    recommendation_service: web::Data<RecommendationService>,
}

impl Application {
    /// Load the catalog and build the model backends.
    pub fn new(config: &Config) -> Result<Self> {
        let catalog = Catalog::load(&config.catalog.path)?;
        let (classifier, embedder) = build_models(config)?;
        let service = build_service(config, Arc::new(catalog), classifier, embedder);
        Ok(Self::with_service(config, service))
    }

    pub fn with_service(config: &Config, service: RecommendationService) -> Self {
        Self {
            port: config.server.port,
            host: config.server.host.clone(),
            precompute_embeddings: config.ml.precompute_embeddings,
            recommendation_service: web::Data::new(service),
        }
    }

    /// Build and run the server
    pub async fn run(&self) -> Result<()> {
        let bind_address = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&bind_address)
            .with_context(|| format!("Failed to bind {}", bind_address))?;
        info!("Starting server at http://{}", bind_address);

        self.run_with_listener(listener).await
    }

    /// Run the server with a specific TCP listener
    /// This is useful for testing where we want to use a random port
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        if self.precompute_embeddings {
            // Startup continues without the cache; it is filled on first use.
            if let Err(e) = self.recommendation_service.prewarm().await {
                warn!("Could not precompute dish embeddings: {}", e);
            }
        }

        let app_config = configure(self.recommendation_service.clone());

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .configure(app_config.clone())
        })
        .listen(listener)?
        .run()
        .await?;

        Ok(())
    }
}
