use std::io::{self, Write};

use crate::models::{CLIConfig, StatusResponse, TaskSummary};

pub fn banner(cfg: &CLIConfig) {
    println!("JurisAI Debug CLI");
    println!("API: {}", cfg.base_url);
    println!(
        "Wait after submit: {}  Poll interval: {}ms",
        cfg.wait, cfg.poll_interval_ms
    );
    println!("Type a legal question, or /help for commands.");
}

pub fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  /help                          Show commands");
    println!("  /exit | /quit                  Exit");
    println!("  <question>                     Submit a legal query");
    println!("  /analyze <text>                Submit document text for analysis");
    println!("  /intake <name>|<type>|<desc>   Submit a client intake");
    println!("  /status <task_id>              Fetch a task snapshot");
    println!("  /watch <task_id>               Poll a task until it finishes");
    println!("  /tasks [limit]                 List recent tasks");
    println!("  /health                        Server health check");
    println!("  /wait [on|off]                 Toggle polling after submit");
    println!("  /config                        Show current config");
    println!("  /base <url>                    Update base URL");
    println!("  /token <token>                 Update bearer token");
}

pub fn submitted(task_id: &str, message: &str) {
    println!("accepted {} ({})", task_id, message);
}

pub fn polling(status: &str) {
    println!("  ... {}", status);
}

pub fn status(resp: &StatusResponse) {
    println!("[{}] {}", resp.status, resp.task_id);
    println!("  created:   {}", resp.created_at);
    if let Some(completed) = &resp.completed_at {
        println!("  completed: {}", completed);
    }
    if let Some(result) = &resp.result {
        let output = result
            .get("output")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        println!("  result:\n{}", output);
    }
    if let Some(error) = &resp.error {
        println!("  error: {}", error);
    }
}

pub fn tasks(tasks: &[TaskSummary]) {
    if tasks.is_empty() {
        println!("no tasks");
        return;
    }
    for task in tasks {
        println!(
            "[{}] {} {} ({})",
            task.status, task.task_id, task.kind, task.created_at
        );
    }
}

pub fn config(cfg: &CLIConfig) {
    println!("config:");
    println!("  base: {}", cfg.base_url);
    println!("  wait: {}", cfg.wait);
    println!("  poll: {}ms", cfg.poll_interval_ms);
    println!("  token set: {}", cfg.token.is_some());
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}
