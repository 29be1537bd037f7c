//! Job lifecycle wire types.
//!
//! Submit responses are duck-typed on the wire (`status` / `url` / `job_id`
//! may each be absent); [`Submission`] pins them down to the two shapes the
//! client actually accepts before any control flow depends on them.

use serde::{Deserialize, Serialize};

/// Body of a generation submit request.  Image and video take a prompt;
/// music takes lyrics plus a style tag.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GenerationRequest {
    Prompt {
        model: String,
        prompt: String,
    },
    Song {
        model: String,
        lyrics: String,
        style: String,
    },
}

/// Raw submit response, exactly as the backend sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
}

/// A submit response validated into one of its two legal shapes: the result
/// was ready immediately, or a job was queued for polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Ready { url: String },
    Queued { job_id: String },
}

/// The backend acknowledged the submit but returned neither a result url
/// nor a job id — there is nothing to show and nothing to poll.
#[derive(Debug, thiserror::Error)]
#[error("submit response carried neither a result url nor a job id")]
pub struct InvalidSubmission;

impl TryFrom<SubmitResponse> for Submission {
    type Error = InvalidSubmission;

    fn try_from(resp: SubmitResponse) -> Result<Self, Self::Error> {
        if resp.status.as_deref() == Some("done") {
            if let Some(url) = resp.url.filter(|u| !u.is_empty()) {
                return Ok(Submission::Ready { url });
            }
        }
        match resp.job_id.filter(|id| !id.is_empty()) {
            Some(job_id) => Ok(Submission::Queued { job_id }),
            None => Err(InvalidSubmission),
        }
    }
}

/// What the result endpoint reports for a queued job.  Status strings other
/// than `done` are shown to the user verbatim.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobResult {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl JobResult {
    /// The result url, if the job reached its terminal `done` state.
    pub fn finished_url(&self) -> Option<&str> {
        if self.status == "done" {
            self.url.as_deref().filter(|u| !u.is_empty())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(json: &str) -> Result<Submission, InvalidSubmission> {
        let resp: SubmitResponse = serde_json::from_str(json).unwrap();
        Submission::try_from(resp)
    }

    #[test]
    fn test_done_with_url_is_ready() {
        let s = submission(r#"{"status":"done","url":"https://cdn/x.png"}"#).unwrap();
        assert_eq!(
            s,
            Submission::Ready {
                url: "https://cdn/x.png".into()
            }
        );
    }

    #[test]
    fn test_done_without_url_falls_back_to_job_id() {
        // "done" with an empty url is not terminal; the job id still wins.
        let s = submission(r#"{"status":"done","url":"","job_id":"j1"}"#).unwrap();
        assert_eq!(s, Submission::Queued { job_id: "j1".into() });
    }

    #[test]
    fn test_pending_with_job_id_is_queued() {
        let s = submission(r#"{"status":"pending","job_id":"j2"}"#).unwrap();
        assert_eq!(s, Submission::Queued { job_id: "j2".into() });
    }

    #[test]
    fn test_neither_url_nor_job_id_is_invalid() {
        assert!(submission(r#"{"status":"pending"}"#).is_err());
        assert!(submission(r#"{}"#).is_err());
    }

    #[test]
    fn test_job_result_terminal_needs_done_and_url() {
        let pending: JobResult = serde_json::from_str(r#"{"status":"pending"}"#).unwrap();
        assert!(pending.finished_url().is_none());

        let done_no_url: JobResult = serde_json::from_str(r#"{"status":"done"}"#).unwrap();
        assert!(done_no_url.finished_url().is_none());

        let done: JobResult =
            serde_json::from_str(r#"{"status":"done","url":"https://cdn/v.mp4"}"#).unwrap();
        assert_eq!(done.finished_url(), Some("https://cdn/v.mp4"));
    }

    #[test]
    fn test_generation_request_serializes_flat() {
        let req = GenerationRequest::Song {
            model: "m".into(),
            lyrics: "la".into(),
            style: "jazz".into(),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["model"], "m");
        assert_eq!(v["lyrics"], "la");
        assert_eq!(v["style"], "jazz");
    }
}
