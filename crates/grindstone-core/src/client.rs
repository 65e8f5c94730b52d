//! Remote judge client.
//!
//! Talks to the judge's REST index, GraphQL question endpoint, and
//! submission API using cookie auth (session + CSRF token). Responses
//! are navigated as loose JSON; absent fields decode to empty values
//! rather than failing the whole fetch.

use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use reqwest::{header, Method};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::ClientError;
use crate::store::{Difficulty, Problem};

const USER_AGENT: &str = "grindstone";
const POLL_INTERVAL: Duration = Duration::from_secs(2);
const POLL_DEADLINE: Duration = Duration::from_secs(40);

const QUESTION_QUERY: &str = "query questionData($titleSlug: String!) {
  question(titleSlug: $titleSlug) {
    questionId
    questionFrontendId
    title
    difficulty
    content
    exampleTestcases
    topicTags { name }
    codeSnippets { langSlug code }
  }
}";

/// One row of the judge's problem index.
#[derive(Debug, Clone)]
pub struct Summary {
    pub slug: String,
    pub title: String,
    pub frontend_id: String,
    pub difficulty: Difficulty,
    pub paid_only: bool,
}

/// Final submission outcome after polling. `status` is the judge's
/// verdict string; "Pending" means the poll deadline passed first.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub id: u64,
    pub status: String,
    pub runtime: String,
    pub memory: String,
}

pub struct Client {
    http: reqwest::Client,
    base: String,
    session: String,
    csrf: String,
    poll_interval: Duration,
    poll_deadline: Duration,
}

impl Client {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Client {
            http,
            base: config.site.base_url.trim_end_matches('/').to_string(),
            session: config.auth.session.clone(),
            csrf: config.auth.csrf.clone(),
            poll_interval: POLL_INTERVAL,
            poll_deadline: POLL_DEADLINE,
        })
    }

    #[cfg(test)]
    fn with_poll_timing(mut self, interval: Duration, deadline: Duration) -> Self {
        self.poll_interval = interval;
        self.poll_deadline = deadline;
        self
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, url);
        if !self.session.is_empty() {
            req = req
                .header(
                    header::COOKIE,
                    format!(
                        "LEETCODE_SESSION={}; csrftoken={}",
                        self.session, self.csrf
                    ),
                )
                .header("x-csrftoken", &self.csrf);
        }
        req
    }

    /// Fetch the full problem index.
    pub async fn summaries(&self) -> Result<Vec<Summary>, ClientError> {
        let url = format!("{}/api/problems/all/", self.base);
        let resp = self.request(Method::GET, &url).send().await?;
        let json = check("problem index", resp).await?;
        let pairs = json["stat_status_pairs"]
            .as_array()
            .ok_or_else(|| ClientError::Decode("missing stat_status_pairs".into()))?;
        let mut out = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let stat = &pair["stat"];
            let slug = stat["question__title_slug"].as_str().unwrap_or("");
            if slug.is_empty() {
                continue;
            }
            out.push(Summary {
                slug: slug.to_string(),
                title: stat["question__title"].as_str().unwrap_or("").to_string(),
                frontend_id: id_string(&stat["frontend_question_id"]),
                difficulty: Difficulty::from_level(
                    pair["difficulty"]["level"].as_u64().unwrap_or(0),
                ),
                paid_only: pair["paid_only"].as_bool().unwrap_or(false),
            });
        }
        debug!(count = out.len(), "fetched problem index");
        Ok(out)
    }

    /// Fetch one question's full metadata. The returned problem carries
    /// the python3 starter stub when the judge offers one.
    pub async fn question(&self, slug: &str) -> Result<Problem, ClientError> {
        let url = format!("{}/graphql", self.base);
        let body = serde_json::json!({
            "operationName": "questionData",
            "variables": { "titleSlug": slug },
            "query": QUESTION_QUERY,
        });
        let resp = self
            .request(Method::POST, &url)
            .header(header::REFERER, format!("{}/problems/{slug}/", self.base))
            .json(&body)
            .send()
            .await?;
        let json = check("question fetch", resp).await?;
        let q = &json["data"]["question"];
        if q.is_null() {
            return Err(ClientError::Decode(format!("no question data for {slug}")));
        }
        let topics = q["topicTags"]
            .as_array()
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| t["name"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        let code_stub = q["codeSnippets"]
            .as_array()
            .and_then(|snips| snips.iter().find(|s| s["langSlug"] == "python3"))
            .and_then(|s| s["code"].as_str())
            .unwrap_or("")
            .to_string();
        Ok(Problem {
            slug: slug.to_string(),
            frontend_id: id_string(&q["questionFrontendId"]),
            question_id: id_string(&q["questionId"]),
            title: q["title"].as_str().unwrap_or("").to_string(),
            difficulty: Difficulty::parse(q["difficulty"].as_str().unwrap_or(""))
                .unwrap_or_default(),
            topics,
            statement: q["content"].as_str().unwrap_or("").to_string(),
            examples: q["exampleTestcases"].as_str().unwrap_or("").to_string(),
            code_stub,
            ..Problem::default()
        })
    }

    /// Verify the configured cookies against the judge. Returns the
    /// signed-in username.
    pub async fn validate_auth(&self) -> Result<String, ClientError> {
        if self.session.is_empty() || self.csrf.is_empty() {
            return Err(ClientError::MissingCredentials);
        }
        let url = format!("{}/graphql", self.base);
        let body = serde_json::json!({
            "operationName": "globalData",
            "query": "query globalData { userStatus { username } }",
        });
        let resp = self.request(Method::POST, &url).json(&body).send().await?;
        let json = check("auth check", resp).await?;
        match json["data"]["userStatus"]["username"].as_str() {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => Err(ClientError::AuthRejected),
        }
    }

    /// Submit solution code and poll for the verdict.
    pub async fn submit(&self, problem: &Problem, code: &str) -> Result<SubmitOutcome, ClientError> {
        if self.session.is_empty() || self.csrf.is_empty() {
            return Err(ClientError::MissingCredentials);
        }
        let url = format!("{}/problems/{}/submit/", self.base, problem.slug);
        let body = serde_json::json!({
            "lang": "python3",
            "question_id": problem.question_id,
            "typed_code": code,
        });
        let resp = self
            .request(Method::POST, &url)
            .header(
                header::REFERER,
                format!("{}/problems/{}/", self.base, problem.slug),
            )
            .json(&body)
            .send()
            .await?;
        let json = check("submit", resp).await?;
        let id = json["submission_id"]
            .as_u64()
            .ok_or_else(|| ClientError::Decode("missing submission_id".into()))?;
        debug!(slug = %problem.slug, id, "submission queued");
        self.poll_submission(id).await
    }

    async fn poll_submission(&self, id: u64) -> Result<SubmitOutcome, ClientError> {
        let url = format!("{}/submissions/detail/{id}/check/", self.base);
        let deadline = Instant::now() + self.poll_deadline;
        loop {
            let resp = self.request(Method::GET, &url).send().await?;
            let json = check("submission poll", resp).await?;
            if json["state"].as_str() == Some("SUCCESS") {
                return Ok(SubmitOutcome {
                    id,
                    status: json["status_msg"].as_str().unwrap_or("Unknown").to_string(),
                    runtime: json["status_runtime"].as_str().unwrap_or("").to_string(),
                    memory: json["status_memory"].as_str().unwrap_or("").to_string(),
                });
            }
            if Instant::now() >= deadline {
                return Ok(SubmitOutcome {
                    id,
                    status: "Pending".to_string(),
                    runtime: String::new(),
                    memory: String::new(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Pick a random unlocked summary, optionally constrained to one
/// difficulty.
pub fn pick_random(
    summaries: &[Summary],
    difficulty: Option<Difficulty>,
) -> Result<&Summary, ClientError> {
    let pool: Vec<&Summary> = summaries
        .iter()
        .filter(|s| !s.paid_only)
        .filter(|s| difficulty.map_or(true, |d| s.difficulty == d))
        .collect();
    pool.choose(&mut rand::thread_rng())
        .copied()
        .ok_or(ClientError::NoMatch)
}

/// Pick up to `count` distinct random unlocked summaries.
pub fn pick_many(
    summaries: &[Summary],
    difficulty: Option<Difficulty>,
    count: usize,
) -> Result<Vec<&Summary>, ClientError> {
    let mut pool: Vec<&Summary> = summaries
        .iter()
        .filter(|s| !s.paid_only)
        .filter(|s| difficulty.map_or(true, |d| s.difficulty == d))
        .collect();
    if pool.is_empty() {
        return Err(ClientError::NoMatch);
    }
    pool.shuffle(&mut rand::thread_rng());
    pool.truncate(count);
    Ok(pool)
}

async fn check(endpoint: &'static str, resp: reqwest::Response) -> Result<Value, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            endpoint,
            status: status.as_u16(),
            body: snippet(body),
        });
    }
    Ok(resp.json().await?)
}

fn snippet(body: String) -> String {
    const MAX: usize = 200;
    if body.chars().count() <= MAX {
        body
    } else {
        body.chars().take(MAX).collect()
    }
}

fn id_string(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard, authed: bool) -> Client {
        let mut config = Config::default();
        config.site.base_url = server.url();
        if authed {
            config.auth.session = "sess".into();
            config.auth.csrf = "tok".into();
        }
        Client::new(&config).unwrap()
    }

    #[tokio::test]
    async fn summaries_decode_the_index() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "user_name": "",
            "stat_status_pairs": [
                {
                    "stat": {
                        "question__title_slug": "two-sum",
                        "question__title": "Two Sum",
                        "frontend_question_id": 1
                    },
                    "difficulty": { "level": 1 },
                    "paid_only": false
                },
                {
                    "stat": {
                        "question__title_slug": "locked-one",
                        "question__title": "Locked",
                        "frontend_question_id": "99"
                    },
                    "difficulty": { "level": 3 },
                    "paid_only": true
                }
            ]
        });
        let mock = server
            .mock("GET", "/api/problems/all/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let summaries = client_for(&server, false).summaries().await.unwrap();
        mock.assert_async().await;
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].slug, "two-sum");
        assert_eq!(summaries[0].frontend_id, "1");
        assert_eq!(summaries[0].difficulty, Difficulty::Easy);
        assert!(summaries[1].paid_only);
        assert_eq!(summaries[1].frontend_id, "99");
    }

    #[tokio::test]
    async fn http_error_carries_endpoint_and_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/problems/all/")
            .with_status(503)
            .with_body("upstream down")
            .create_async()
            .await;

        let err = client_for(&server, false).summaries().await.unwrap_err();
        match err {
            ClientError::Status { endpoint, status, body } => {
                assert_eq!(endpoint, "problem index");
                assert_eq!(status, 503);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn question_maps_the_graphql_payload() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "data": {
                "question": {
                    "questionId": "1",
                    "questionFrontendId": "1",
                    "title": "Two Sum",
                    "difficulty": "Easy",
                    "content": "<p>Given an array...</p>",
                    "exampleTestcases": "[2,7,11,15]\n9",
                    "topicTags": [{ "name": "Array" }, { "name": "Hash Table" }],
                    "codeSnippets": [
                        { "langSlug": "cpp", "code": "class Solution {};" },
                        { "langSlug": "python3", "code": "class Solution:\n    def twoSum(self):" }
                    ]
                }
            }
        });
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let p = client_for(&server, false).question("two-sum").await.unwrap();
        assert_eq!(p.slug, "two-sum");
        assert_eq!(p.title, "Two Sum");
        assert_eq!(p.difficulty, Difficulty::Easy);
        assert_eq!(p.topics, vec!["Array".to_string(), "Hash Table".to_string()]);
        assert!(p.code_stub.contains("def twoSum"));
        assert_eq!(p.examples, "[2,7,11,15]\n9");
    }

    #[tokio::test]
    async fn question_null_payload_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "data": { "question": null } }).to_string())
            .create_async()
            .await;

        let err = client_for(&server, false).question("gone").await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn validate_auth_returns_the_username() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "data": { "userStatus": { "username": "grinder" } } }).to_string(),
            )
            .create_async()
            .await;

        let name = client_for(&server, true).validate_auth().await.unwrap();
        assert_eq!(name, "grinder");
    }

    #[tokio::test]
    async fn validate_auth_requires_a_username() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "data": { "userStatus": { "username": "" } } }).to_string())
            .create_async()
            .await;

        let err = client_for(&server, true).validate_auth().await.unwrap_err();
        assert!(matches!(err, ClientError::AuthRejected));
    }

    #[tokio::test]
    async fn auth_calls_without_cookies_short_circuit() {
        let server = mockito::Server::new_async().await;
        let client = client_for(&server, false);
        assert!(matches!(
            client.validate_auth().await.unwrap_err(),
            ClientError::MissingCredentials
        ));
        let problem = Problem {
            slug: "two-sum".into(),
            question_id: "1".into(),
            ..Problem::default()
        };
        assert!(matches!(
            client.submit(&problem, "code").await.unwrap_err(),
            ClientError::MissingCredentials
        ));
    }

    #[tokio::test]
    async fn submit_polls_until_the_verdict() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/problems/two-sum/submit/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "submission_id": 42 }).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/submissions/detail/42/check/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "state": "SUCCESS",
                    "status_msg": "Accepted",
                    "status_runtime": "52 ms",
                    "status_memory": "16.4 MB"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let problem = Problem {
            slug: "two-sum".into(),
            question_id: "1".into(),
            ..Problem::default()
        };
        let outcome = client_for(&server, true)
            .submit(&problem, "class Solution: pass")
            .await
            .unwrap();
        assert_eq!(outcome.id, 42);
        assert_eq!(outcome.status, "Accepted");
        assert_eq!(outcome.runtime, "52 ms");
    }

    #[tokio::test]
    async fn submit_deadline_yields_pending() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/problems/two-sum/submit/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "submission_id": 7 }).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/submissions/detail/7/check/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "state": "STARTED" }).to_string())
            .expect_at_least(1)
            .create_async()
            .await;

        let problem = Problem {
            slug: "two-sum".into(),
            question_id: "1".into(),
            ..Problem::default()
        };
        let outcome = client_for(&server, true)
            .with_poll_timing(Duration::from_millis(5), Duration::from_millis(20))
            .submit(&problem, "code")
            .await
            .unwrap();
        assert_eq!(outcome.id, 7);
        assert_eq!(outcome.status, "Pending");
        assert!(outcome.runtime.is_empty());
    }

    #[test]
    fn random_pick_skips_paid_and_honors_difficulty() {
        let summaries = vec![
            Summary {
                slug: "free-easy".into(),
                title: "A".into(),
                frontend_id: "1".into(),
                difficulty: Difficulty::Easy,
                paid_only: false,
            },
            Summary {
                slug: "paid-easy".into(),
                title: "B".into(),
                frontend_id: "2".into(),
                difficulty: Difficulty::Easy,
                paid_only: true,
            },
            Summary {
                slug: "free-hard".into(),
                title: "C".into(),
                frontend_id: "3".into(),
                difficulty: Difficulty::Hard,
                paid_only: false,
            },
        ];
        let pick = pick_random(&summaries, Some(Difficulty::Hard)).unwrap();
        assert_eq!(pick.slug, "free-hard");
        for _ in 0..20 {
            let pick = pick_random(&summaries, None).unwrap();
            assert_ne!(pick.slug, "paid-easy");
        }
        assert!(matches!(
            pick_random(&summaries, Some(Difficulty::Medium)),
            Err(ClientError::NoMatch)
        ));

        let many = pick_many(&summaries, None, 10).unwrap();
        assert_eq!(many.len(), 2);
        assert!(many.iter().all(|s| !s.paid_only));
        assert!(matches!(
            pick_many(&summaries, Some(Difficulty::Medium), 3),
            Err(ClientError::NoMatch)
        ));
    }
}
