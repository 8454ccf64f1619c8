//!
//! GraphQL client for a wave-portal indexer.
//!
//! This module provides an async client for interacting with the portal's
//! GraphQL indexer. It supports bulk and count queries, wave submission with
//! confirmation polling, and a real-time subscription to newly mined waves.
//! All methods are async and designed for use with Tokio.

use super::types::*;
use super::{LedgerClient, PendingWave, WaveEventStream};
use backoff::ExponentialBackoff;
use futures_util::{SinkExt, StreamExt};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tokio_tungstenite::{
	connect_async,
	tungstenite::{Message, client::IntoClientRequest},
};
use tracing::{debug, error, info};

/// Wave-portal GraphQL indexer client
#[derive(Clone)]
pub struct PortalLedgerClient {
	/// The underlying HTTP client for GraphQL queries.
	http_client: Client,
	/// The base URL for the indexer GraphQL HTTP endpoint.
	indexer_url: String,
	/// The WebSocket URL for real-time subscriptions.
	ws_url: String,
}

impl PortalLedgerClient {
	/// Create a new ledger client.
	///
	/// # Arguments
	/// * `indexer_url` - The HTTP endpoint for GraphQL queries.
	/// * `ws_url` - The WebSocket endpoint for subscriptions.
	pub fn new(indexer_url: String, ws_url: String) -> Self {
		let http_client = Client::builder()
			.timeout(Duration::from_secs(30))
			.build()
			.expect("Failed to create HTTP client");

		Self {
			http_client,
			indexer_url,
			ws_url,
		}
	}

	/// Execute a GraphQL query.
	///
	/// # Arguments
	/// * `query` - The GraphQL query string.
	/// * `variables` - Optional variables for the query.
	///
	/// # Returns
	/// The JSON response from the indexer, or a `LedgerError` if the request fails.
	pub async fn execute_query(
		&self,
		query: &str,
		variables: Option<serde_json::Value>,
	) -> Result<serde_json::Value, LedgerError> {
		let request_body = json!({
			"query": query,
			"variables": variables
		});

		let response = self
			.http_client
			.post(&self.indexer_url)
			.header("Content-Type", "application/json")
			.json(&request_body)
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(LedgerError::GraphQLError(format!(
				"HTTP error: {}",
				response.status()
			)));
		}

		let response_json: serde_json::Value = response.json().await?;

		if let Some(errors) = response_json.get("errors") {
			return Err(LedgerError::GraphQLError(format!(
				"GraphQL errors: {}",
				errors
			)));
		}

		Ok(response_json)
	}

	/// Query the current status of a submitted wave transaction.
	async fn transaction_status(&self, hash: &str) -> Result<TxStatus, LedgerError> {
		let query = r#"
            query WaveTransaction($hash: String!) {
                transaction(hash: $hash) {
                    status
                }
            }
        "#;

		let response = self
			.execute_query(query, Some(json!({ "hash": hash })))
			.await?;

		decode_status(&response)
	}
}

fn decode_waves(response: &serde_json::Value) -> Result<Vec<WaveRecord>, LedgerError> {
	let waves = response
		.pointer("/data/waves")
		.ok_or(LedgerError::NoData)?;
	Ok(serde_json::from_value(waves.clone())?)
}

fn decode_total(response: &serde_json::Value) -> Result<u64, LedgerError> {
	response
		.pointer("/data/totalWaves")
		.and_then(|total| total.as_u64())
		.ok_or(LedgerError::NoData)
}

fn decode_status(response: &serde_json::Value) -> Result<TxStatus, LedgerError> {
	let status = response
		.pointer("/data/transaction/status")
		.ok_or(LedgerError::NoData)?;
	Ok(serde_json::from_value(status.clone())?)
}

#[async_trait::async_trait]
impl LedgerClient for PortalLedgerClient {
	async fn get_all_waves(&self) -> Result<Vec<WaveRecord>, LedgerError> {
		let query = r#"
            query AllWaves {
                waves {
                    waver
                    timestamp
                    message
                }
            }
        "#;

		let response = self.execute_query(query, None).await?;
		let waves = decode_waves(&response)?;

		debug!("Fetched {} waves from the indexer", waves.len());
		Ok(waves)
	}

	async fn get_total_waves(&self) -> Result<u64, LedgerError> {
		let query = r#"
            query TotalWaves {
                totalWaves
            }
        "#;

		let response = self.execute_query(query, None).await?;
		decode_total(&response)
	}

	async fn submit_wave(
		&self,
		from: &str,
		message: &str,
	) -> Result<Box<dyn PendingWave>, LedgerError> {
		let query = r#"
            mutation SubmitWave($from: String!, $message: String!) {
                submitWave(from: $from, message: $message) {
                    hash
                }
            }
        "#;

		let variables = json!({
			"from": from,
			"message": message
		});

		let response = self
			.execute_query(query, Some(variables))
			.await
			.map_err(|e| LedgerError::Rejected(e.to_string()))?;

		let hash = response
			.pointer("/data/submitWave/hash")
			.and_then(|hash| hash.as_str())
			.ok_or(LedgerError::NoData)?
			.to_string();

		info!("Wave dispatched with transaction hash {}", hash);

		Ok(Box::new(PendingPortalWave {
			client: self.clone(),
			hash,
		}))
	}

	async fn subscribe_new_waves(&self) -> Result<WaveEventStream, LedgerError> {
		debug!("Attempting WebSocket connection to: {}", self.ws_url);

		// Create WebSocket request with required subprotocol
		let mut request = self.ws_url.clone().into_client_request()?;
		request.headers_mut().insert(
			"Sec-WebSocket-Protocol",
			"graphql-transport-ws".parse().map_err(|_| {
				LedgerError::GraphQLError("Invalid WebSocket subprotocol header value".to_string())
			})?,
		);

		let (ws_stream, response) = connect_async(request).await?;
		debug!(
			"WebSocket connection established, response status: {}",
			response.status()
		);
		let (mut ws_sender, mut ws_receiver) = ws_stream.split();

		// Send connection init
		let init_message = json!({
			"type": "connection_init"
		});
		ws_sender
			.send(Message::Text(init_message.to_string()))
			.await?;

		// Wait for connection ack
		if let Some(msg) = ws_receiver.next().await {
			match msg? {
				Message::Text(text) => {
					let parsed: serde_json::Value = serde_json::from_str(&text)?;
					if parsed.get("type")
						!= Some(&serde_json::Value::String("connection_ack".to_string()))
					{
						return Err(LedgerError::GraphQLError(
							"Connection not acknowledged".to_string(),
						));
					}
				}
				_ => {
					return Err(LedgerError::GraphQLError(
						"Unexpected message type during handshake".to_string(),
					));
				}
			}
		}

		// Start the new-wave subscription
		let subscription_query = r#"
            subscription NewWaves {
                newWave {
                    waver
                    timestamp
                    message
                }
            }
        "#;

		let start_message = json!({
			"id": "new-waves",
			"type": "subscribe",
			"payload": {
				"query": subscription_query
			}
		});

		ws_sender
			.send(Message::Text(start_message.to_string()))
			.await?;

		// Return stream of wave events
		let stream = ws_receiver.filter_map(|msg| async move {
			match msg {
				Ok(Message::Text(text)) => {
					match serde_json::from_str::<serde_json::Value>(&text) {
						Ok(parsed) => {
							// Handle different message types
							if let Some(msg_type) = parsed.get("type").and_then(|t| t.as_str()) {
								match msg_type {
									"next" => {
										if let Some(wave_data) =
											parsed.pointer("/payload/data/newWave")
										{
											match serde_json::from_value::<WaveRecord>(
												wave_data.clone(),
											) {
												Ok(record) => Some(Ok(record)),
												Err(e) => {
													error!(
														"Failed to deserialize wave event: {}",
														e
													);
													Some(Err(LedgerError::JsonError(e)))
												}
											}
										} else {
											Some(Err(LedgerError::NoData))
										}
									}
									"error" => {
										let error_msg = parsed
											.pointer("/payload/message")
											.and_then(|m| m.as_str())
											.unwrap_or("Unknown subscription error");
										Some(Err(LedgerError::GraphQLError(error_msg.to_string())))
									}
									"complete" => {
										debug!("Wave subscription completed");
										None // End the stream
									}
									_ => {
										debug!("Ignoring message type: {}", msg_type);
										None // Skip other message types
									}
								}
							} else {
								Some(Err(LedgerError::GraphQLError(
									"Message missing type field".to_string(),
								)))
							}
						}
						Err(e) => Some(Err(LedgerError::JsonError(e))),
					}
				}
				Ok(_) => Some(Err(LedgerError::GraphQLError(
					"Unexpected message type".to_string(),
				))),
				Err(e) => Some(Err(LedgerError::WebSocketError(e))),
			}
		});

		Ok(Box::pin(stream))
	}
}

/// A submitted wave awaiting finalization by the ledger.
///
/// Confirmation is observed by polling the transaction status with exponential
/// backoff until the indexer reports a final status. The overall wait is
/// bounded by the caller, not here.
struct PendingPortalWave {
	client: PortalLedgerClient,
	hash: String,
}

#[async_trait::async_trait]
impl PendingWave for PendingPortalWave {
	fn hash(&self) -> &str {
		&self.hash
	}

	async fn await_confirmation(self: Box<Self>) -> Result<WaveReceipt, LedgerError> {
		let policy = ExponentialBackoff {
			initial_interval: Duration::from_secs(1),
			max_interval: Duration::from_secs(10),
			max_elapsed_time: None,
			..ExponentialBackoff::default()
		};

		let client = self.client;
		let hash = self.hash;

		backoff::future::retry(policy, || async {
			let status = client
				.transaction_status(&hash)
				.await
				.map_err(backoff::Error::permanent)?;

			match status {
				TxStatus::Confirmed => Ok(WaveReceipt {
					hash: hash.clone(),
					status,
				}),
				TxStatus::Failed => Err(backoff::Error::permanent(
					LedgerError::ConfirmationFailed(format!(
						"transaction {} failed on the ledger",
						hash
					)),
				)),
				TxStatus::Pending => {
					debug!("Transaction {} still pending, polling again", hash);
					Err(backoff::Error::transient(LedgerError::ConfirmationFailed(
						"transaction still pending".to_string(),
					)))
				}
			}
		})
		.await
	}
}
