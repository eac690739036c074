//! Scripted in-process transport used by gateway unit tests.

// std
use std::collections::VecDeque;
// crates.io
use parking_lot::Mutex;
// self
use crate::{
	_prelude::*,
	error::TransportError,
	http::{GatewayHttpClient, GatewayRequest, GatewayResponse, TransportFuture},
};

/// One scripted transport outcome.
pub(crate) enum Reply {
	Status(u16, &'static str),
	Timeout,
}

/// Transport double that records every request and pops scripted replies,
/// routing by path so data calls and refresh calls have separate scripts.
pub(crate) struct ScriptedClient {
	refresh_path: String,
	data: Mutex<VecDeque<Reply>>,
	refresh: Mutex<VecDeque<Reply>>,
	requests: Mutex<Vec<GatewayRequest>>,
}
impl ScriptedClient {
	pub(crate) fn new(refresh_path: impl Into<String>) -> Self {
		Self {
			refresh_path: refresh_path.into(),
			data: Mutex::new(VecDeque::new()),
			refresh: Mutex::new(VecDeque::new()),
			requests: Mutex::new(Vec::new()),
		}
	}

	pub(crate) fn push_data(&self, status: u16, body: &'static str) {
		self.data.lock().push_back(Reply::Status(status, body));
	}

	pub(crate) fn push_refresh(&self, status: u16, body: &'static str) {
		self.refresh.lock().push_back(Reply::Status(status, body));
	}

	pub(crate) fn push_refresh_timeout(&self) {
		self.refresh.lock().push_back(Reply::Timeout);
	}

	pub(crate) fn recorded(&self) -> Vec<GatewayRequest> {
		self.requests.lock().clone()
	}

	pub(crate) fn refresh_calls(&self) -> usize {
		self.requests.lock().iter().filter(|req| req.url.path() == self.refresh_path).count()
	}
}
impl GatewayHttpClient for ScriptedClient {
	fn execute(&self, request: GatewayRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			self.requests.lock().push(request.clone());

			let queue =
				if request.url.path() == self.refresh_path { &self.refresh } else { &self.data };
			let reply = queue
				.lock()
				.pop_front()
				.unwrap_or_else(|| panic!("Scripted transport ran out of replies for {}", request.url));

			match reply {
				Reply::Status(status, body) => Ok(GatewayResponse {
					status,
					headers: Vec::new(),
					body: body.as_bytes().to_vec(),
				}),
				Reply::Timeout => Err(TransportError::Timeout),
			}
		})
	}
}

/// Parses a URL fixture, panicking on bad test input.
pub(crate) fn url(value: &str) -> Url {
	Url::parse(value).expect("Test URL fixture should parse successfully.")
}
