use crate::{
    activity::build_tasks,
    client::ManagementClient,
    domain::{PipelineListResponse, RemotePipeline},
};
use adf_domain::{
    AdfConnectionConfig, CreatePipelineRequest, EntityReference, ExtractionError, Source, Unit,
};
use azure_token_fetcher::{AzureTokenFetcher, ClientCredentials, FetcherExt};
use futures::{stream, Stream, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

/// Reads pipelines of one Data Factory and turns each into a catalog
/// `CreatePipelineRequest`.
///
/// The access token is acquired once in [`AdfSource::new`] and lives as long
/// as the source; it is never refreshed.
#[derive(Debug)]
pub struct AdfSource {
    subscription_id: String,
    resource_group: String,
    factory_name: String,
    service_name: String,
    project: String,
    client: ManagementClient,
}

impl AdfSource {
    pub async fn new(config: AdfConnectionConfig) -> Result<Self, ExtractionError> {
        let fetcher = AzureTokenFetcher::from_config(&config);
        Self::with_fetcher(config, &fetcher).await
    }

    pub async fn with_fetcher<F>(
        config: AdfConnectionConfig,
        fetcher: &F,
    ) -> Result<Self, ExtractionError>
    where
        F: FetcherExt + Sync,
    {
        config.validate()?;

        let token = fetcher
            .get_token(&ClientCredentials::from(&config))
            .await?;
        let client =
            ManagementClient::new(&config.management_url, &token, config.request_timeout())?;

        info!(
            factory = %config.factory_name,
            project = %config.project,
            "Authenticated against the management API"
        );

        Ok(Self {
            subscription_id: config.subscription_id,
            resource_group: config.resource_group,
            factory_name: config.factory_name,
            service_name: config.service_name,
            project: config.project,
            client,
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    fn pipelines_path(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.DataFactory/factories/{}/pipelines",
            self.subscription_id, self.resource_group, self.factory_name
        )
    }

    /// Lists the first page of pipelines only. A `nextLink` is reported but
    /// not followed.
    async fn list_pipelines(&self) -> Result<Vec<RemotePipeline>, ExtractionError> {
        let page: PipelineListResponse = self.client.get(&self.pipelines_path(), None).await?;

        if let Some(next_link) = &page.next_link {
            warn!(
                factory = %self.factory_name,
                emitted = page.value.len(),
                %next_link,
                "Pipeline listing has more pages; only the first page is extracted"
            );
        }

        debug!(count = page.value.len(), "Listed pipelines");
        Ok(page.value)
    }

    fn build_record(&self, pipeline: RemotePipeline) -> CreatePipelineRequest {
        let tasks = pipeline
            .properties
            .as_ref()
            .map(|properties| build_tasks(&properties.activities))
            .unwrap_or_default();

        debug!(pipeline = %pipeline.name, tasks = tasks.len(), "Built pipeline record");

        CreatePipelineRequest {
            display_name: pipeline.name.clone(),
            description: pipeline.description().map(str::to_owned),
            service: EntityReference::pipeline_service(&self.service_name),
            tasks,
            source_url: pipeline.id.unwrap_or_default(),
            name: pipeline.name,
        }
    }
}

impl Source for AdfSource {
    type Config = AdfConnectionConfig;
    type Record = CreatePipelineRequest;

    async fn create(config: Self::Config) -> Result<Self, ExtractionError> {
        Self::new(config).await
    }

    fn prepare(&mut self) -> Result<Unit, ExtractionError> {
        Ok(())
    }

    fn next_record(
        &self,
    ) -> impl Stream<Item = Result<CreatePipelineRequest, ExtractionError>> + Send + '_ {
        stream::once(self.list_pipelines())
            .map_ok(move |pipelines| {
                stream::iter(pipelines)
                    .map(move |pipeline| Ok::<_, ExtractionError>(self.build_record(pipeline)))
            })
            .try_flatten()
    }

    fn close(self) {
        info!(factory = %self.factory_name, "Closing management API session");
    }
}
