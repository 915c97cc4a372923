use std::io;
use std::thread;
use std::time::Duration;

use crate::client::HTTPClient;
use crate::models::{CLIConfig, ClientIntakeRequest, DocumentAnalysisRequest, LegalQueryRequest};
use crate::render;

const MAX_POLLS: usize = 600;

pub struct REPL {
    pub config: CLIConfig,
    pub client: HTTPClient,
}

impl REPL {
    pub fn new(config: CLIConfig, client: HTTPClient) -> Self {
        Self { config, client }
    }

    pub fn run(&mut self) {
        render::banner(&self.config);
        loop {
            render::prompt();
            let mut line = String::new();
            if io::stdin().read_line(&mut line).is_err() {
                break;
            }
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('/') {
                if self.handle_command(&line) {
                    break;
                }
                continue;
            }
            // A plain line is a legal query.
            self.submit_query(&line);
        }
    }

    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("").trim_start_matches('/');
        let rest = parts.next().unwrap_or("").trim();
        match cmd {
            "exit" | "quit" => return true,
            "help" => render::help(),
            "analyze" => {
                if rest.is_empty() {
                    render::error("usage: /analyze <document text>");
                } else {
                    self.analyze(rest);
                }
            }
            "intake" => {
                if rest.is_empty() {
                    render::error("usage: /intake <name> | <case_type> | <description>");
                } else {
                    self.intake(rest);
                }
            }
            "status" => {
                if rest.is_empty() {
                    render::error("usage: /status <task_id>");
                } else {
                    self.show_status(rest);
                }
            }
            "watch" => {
                if rest.is_empty() {
                    render::error("usage: /watch <task_id>");
                } else {
                    self.watch(rest);
                }
            }
            "tasks" => {
                let limit = rest.parse::<usize>().unwrap_or(10);
                self.list_tasks(limit);
            }
            "health" => match self.client.health() {
                Ok(value) => render::info(&value.to_string()),
                Err(err) => render::error(&err),
            },
            "wait" => {
                if rest.is_empty() {
                    self.config.wait = !self.config.wait;
                } else if let Some(flag) = parse_on_off(rest) {
                    self.config.wait = flag;
                } else {
                    render::error("invalid wait flag");
                    return false;
                }
                render::info(&format!("wait: {}", self.config.wait));
            }
            "config" => render::config(&self.config),
            "base" => {
                if rest.is_empty() {
                    render::info(&format!("base: {}", self.config.base_url));
                } else {
                    self.config.base_url = rest.to_string();
                    self.client = HTTPClient::new(&self.config.base_url, self.config.token.clone());
                    render::info("base url updated");
                }
            }
            "token" => {
                if rest.is_empty() {
                    render::info(&format!("token set: {}", self.config.token.is_some()));
                } else {
                    self.config.token = Some(rest.to_string());
                    self.client = HTTPClient::new(&self.config.base_url, self.config.token.clone());
                    render::info("token updated");
                }
            }
            _ => render::info("unknown command, type /help"),
        }
        false
    }

    fn submit_query(&self, query: &str) {
        let req = LegalQueryRequest {
            query: query.to_string(),
            ..Default::default()
        };
        match self.client.submit_query(req) {
            Ok(resp) => self.after_submit(resp.task_id, &resp.message),
            Err(err) => render::error(&err),
        }
    }

    fn analyze(&self, text: &str) {
        let req = DocumentAnalysisRequest {
            document_text: Some(text.to_string()),
            ..Default::default()
        };
        match self.client.analyze_document(req) {
            Ok(resp) => self.after_submit(resp.task_id, &resp.message),
            Err(err) => render::error(&err),
        }
    }

    fn intake(&self, rest: &str) {
        let fields: Vec<&str> = rest.splitn(3, '|').map(|f| f.trim()).collect();
        if fields.len() != 3 {
            render::error("usage: /intake <name> | <case_type> | <description>");
            return;
        }
        let req = ClientIntakeRequest {
            client_name: fields[0].to_string(),
            case_type: fields[1].to_string(),
            case_description: fields[2].to_string(),
        };
        match self.client.client_intake(req) {
            Ok(resp) => self.after_submit(resp.task_id, &resp.message),
            Err(err) => render::error(&err),
        }
    }

    fn after_submit(&self, task_id: String, message: &str) {
        render::submitted(&task_id, message);
        if self.config.wait {
            self.watch(&task_id);
        }
    }

    fn watch(&self, task_id: &str) {
        for _ in 0..MAX_POLLS {
            match self.client.status(task_id) {
                Ok(resp) => {
                    if resp.is_terminal() {
                        render::status(&resp);
                        return;
                    }
                    render::polling(&resp.status);
                }
                Err(err) => {
                    render::error(&err);
                    return;
                }
            }
            thread::sleep(Duration::from_millis(self.config.poll_interval_ms));
        }
        render::error("gave up waiting; try /status later");
    }

    fn show_status(&self, task_id: &str) {
        match self.client.status(task_id) {
            Ok(resp) => render::status(&resp),
            Err(err) => render::error(&err),
        }
    }

    fn list_tasks(&self, limit: usize) {
        match self.client.list_tasks(limit) {
            Ok(tasks) => render::tasks(&tasks),
            Err(err) => render::error(&err),
        }
    }
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
