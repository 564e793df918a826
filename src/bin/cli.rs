use polars::prelude::{AnyValue, DataFrame};
use skill_schedule::report::{comparison_frame, schedule_frame, time_bounds_frame};
use skill_schedule::{
    BatchReport, EngineConfig, FeatureVector, GreedyScheduler, PriorityRanker, PriorityRule,
    ProjectInstance, Schedule, ScheduleStatus, SortOrder, UnknownRule, evaluate_rules,
    load_instance, save_batch_report_to_csv, save_batch_report_to_json, save_schedule_to_csv,
    save_schedule_to_json, search_order,
};
use std::io::{self, Write};
use std::path::Path;

struct Session {
    instance: Option<(String, ProjectInstance)>,
    config: EngineConfig,
    hint: Vec<String>,
    last_schedule: Option<Schedule>,
    last_report: Option<BatchReport>,
}

fn cell_text(av: &AnyValue<'_>) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Boolean(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        rows.push(
            columns
                .iter()
                .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
                .collect(),
        );
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &rows {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let push_row = |out: &mut String, cells: &[String]| {
        out.push('|');
        for (ci, s) in cells.iter().enumerate() {
            out.push(' ');
            out.push_str(s);
            out.push_str(&" ".repeat(widths[ci].saturating_sub(s.len())));
            out.push_str(" |");
        }
        out.push('\n');
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, &col_names);
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row);
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  load <path>                        Load an instance (.msrcp or .json)\n  info                               Show instance summary\n  bounds                             Show CPM time bounds\n  rules                              List priority rules\n  order <rule>                       Show the precedence-feasible order of a rule\n  run <rule>                         Schedule with one rule\n  runall                             Schedule with every rule (hinted rules first)\n  hint [r1,r2,...]                   Set or clear the rule hint\n  features                           Show the instance feature vector\n  verify                             Check the last schedule\n  config show                        Show the engine config\n  config set <json>                  Replace the config (missing fields use defaults)\n  config load <path>                 Load the config from a JSON file\n  config save <path>                 Save the config as JSON\n  config default                     Restore the default config\n  save <json|csv> <path>             Save the last schedule\n  report <json|csv> <path>           Save the last runall report\n  quit|exit                          Exit"
    );
}

fn print_schedule(schedule: &Schedule) {
    match schedule.status() {
        ScheduleStatus::Complete => println!(
            "Rule {}: complete, makespan {} (relaxation level {})",
            schedule.rule(),
            schedule.makespan(),
            schedule.relaxation_level()
        ),
        ScheduleStatus::Incomplete { missing } => println!(
            "Rule {}: INCOMPLETE, {} activities unscheduled {:?} (relaxation level {})",
            schedule.rule(),
            missing.len(),
            missing,
            schedule.relaxation_level()
        ),
    }
    match schedule_frame(schedule) {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error: {}", e),
    }
}

impl Session {
    fn new() -> Self {
        Self {
            instance: None,
            config: EngineConfig::default(),
            hint: Vec::new(),
            last_schedule: None,
            last_report: None,
        }
    }

    fn instance(&self) -> Option<&(String, ProjectInstance)> {
        if self.instance.is_none() {
            println!("No instance loaded. Use 'load <path>'.");
        }
        self.instance.as_ref()
    }

    fn load(&mut self, path: &str) {
        match load_instance(path) {
            Ok(instance) => {
                let name = Path::new(path)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.to_string());
                println!(
                    "Loaded '{}': {} activities, {} resources, {} skills",
                    name,
                    instance.num_activities(),
                    instance.num_resources(),
                    instance.num_skills()
                );
                self.instance = Some((name, instance));
                self.last_schedule = None;
                self.last_report = None;
            }
            Err(e) => println!("Load error: {}", e),
        }
    }

    fn info(&self) {
        let Some((name, instance)) = self.instance() else {
            return;
        };
        let header = instance.header();
        println!("Instance:          {}", name);
        println!("Activities:        {}", header.num_activities);
        println!("Resources:         {}", header.num_resources);
        println!("Skills:            {}", header.num_skills);
        println!("Levels:            {}", header.num_levels);
        println!("Base deadline:     {}", header.base_deadline);
        println!("Level deadline:    {}", header.level_deadline);
        println!("Critical path:     {}", instance.critical_path_length());
        println!("Horizon:           {}", instance.horizon());
        println!("Critical activities: {:?}", instance.critical_path());
    }

    fn run(&mut self, rule_s: &str) {
        let rule: PriorityRule = match rule_s.parse() {
            Ok(r) => r,
            Err(e) => {
                println!("Error: {}", e);
                return;
            }
        };
        let Some((_, instance)) = self.instance() else {
            return;
        };
        let scheduler = match GreedyScheduler::with_config(instance, self.config.scheduler.clone())
        {
            Ok(s) => s,
            Err(e) => {
                println!("Config error: {}", e);
                return;
            }
        };
        let schedule = scheduler.schedule(rule);
        print_schedule(&schedule);
        self.last_schedule = Some(schedule);
    }

    /// Hinted rules first, restricted to the configured rule subset.
    fn rule_order(&self) -> Result<Vec<PriorityRule>, UnknownRule> {
        let order = search_order(&self.hint)?;
        let selected = self.config.batch.selected_rules()?;
        Ok(order.into_iter().filter(|r| selected.contains(r)).collect())
    }

    fn run_all(&mut self) {
        let rules = match self.rule_order() {
            Ok(rules) => rules,
            Err(e) => {
                println!("Error: {}", e);
                return;
            }
        };
        let Some((name, instance)) = self.instance() else {
            return;
        };
        let results = match evaluate_rules(name, instance, &rules, &self.config.scheduler) {
            Ok(results) => results,
            Err(e) => {
                println!("Config error: {}", e);
                return;
            }
        };

        let (summaries, schedules): (Vec<_>, Vec<_>) = results.into_iter().unzip();
        let report = BatchReport::new(summaries);
        match comparison_frame(&report) {
            Ok(df) => println!("{}", render_df_as_text_table(&df)),
            Err(e) => println!("Error: {}", e),
        }
        let best = report.best_by_instance().first().map(|run| run.rule);
        match best {
            Some(rule) => {
                println!("Best rule: {}", rule);
                self.last_schedule = schedules.into_iter().find(|s| s.rule() == rule);
            }
            None => {
                println!("No rule produced a complete schedule.");
                self.last_schedule = None;
            }
        }
        self.last_report = Some(report);
    }

    fn config(&mut self, sub: Option<&str>, rest: &str) {
        match sub {
            Some("show") => match serde_json::to_string_pretty(&self.config) {
                Ok(text) => println!("{}", text),
                Err(e) => println!("Error: {}", e),
            },
            Some("set") if !rest.is_empty() => match EngineConfig::from_json_str(rest) {
                Ok(config) => {
                    self.config = config;
                    println!("Config updated.");
                }
                Err(e) => println!("Config error: {}", e),
            },
            Some("load") if !rest.is_empty() => match EngineConfig::from_json_file(rest) {
                Ok(config) => {
                    self.config = config;
                    println!("Config loaded from {}", rest);
                }
                Err(e) => println!("Config error: {}", e),
            },
            Some("save") if !rest.is_empty() => match self.config.to_json_file(rest) {
                Ok(_) => println!("Config saved to {}", rest),
                Err(e) => println!("Config error: {}", e),
            },
            Some("default") => {
                self.config = EngineConfig::default();
                println!("Config reset to defaults.");
            }
            _ => println!("Usage: config show|set <json>|load <path>|save <path>|default"),
        }
    }

    fn save(&self, format: Option<&str>, path: Option<&str>) {
        let Some(schedule) = &self.last_schedule else {
            println!("No schedule yet. Use 'run <rule>' or 'runall'.");
            return;
        };
        let res = match (format, path) {
            (Some("json"), Some(path)) => save_schedule_to_json(schedule, path),
            (Some("csv"), Some(path)) => save_schedule_to_csv(schedule, path),
            _ => {
                println!("Usage: save <json|csv> <path>");
                return;
            }
        };
        match res {
            Ok(_) => println!("Schedule saved to {}", path.unwrap_or_default()),
            Err(e) => println!("Save error: {}", e),
        }
    }

    fn report(&self, format: Option<&str>, path: Option<&str>) {
        let Some(report) = &self.last_report else {
            println!("No report yet. Use 'runall'.");
            return;
        };
        let res = match (format, path) {
            (Some("json"), Some(path)) => save_batch_report_to_json(report, path),
            (Some("csv"), Some(path)) => save_batch_report_to_csv(report, path),
            _ => {
                println!("Usage: report <json|csv> <path>");
                return;
            }
        };
        match res {
            Ok(_) => println!("Report saved to {}", path.unwrap_or_default()),
            Err(e) => println!("Save error: {}", e),
        }
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_logging();
    let mut session = Session::new();

    println!("Skill Schedule Tool (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let (cmd, rest) = input.split_once(char::is_whitespace).unwrap_or((input, ""));
        let rest = rest.trim();
        let mut parts = rest.split_whitespace();

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "load" => match parts.next() {
                Some(path) => session.load(path),
                None => println!("Usage: load <path>"),
            },
            "info" => session.info(),
            "bounds" => {
                if let Some((_, instance)) = session.instance() {
                    match time_bounds_frame(instance) {
                        Ok(df) => println!("{}", render_df_as_text_table(&df)),
                        Err(e) => println!("Error: {}", e),
                    }
                }
            }
            "rules" => {
                for rule in PriorityRule::ALL {
                    let order = match rule.order() {
                        SortOrder::Ascending => "asc",
                        SortOrder::Descending => "desc",
                    };
                    println!("  {:<7} {:<5} {}", rule.name(), order, rule.description());
                }
            }
            "order" => {
                let Some(rule_s) = parts.next() else {
                    println!("Usage: order <rule>");
                    continue;
                };
                let rule: PriorityRule = match rule_s.parse() {
                    Ok(r) => r,
                    Err(e) => {
                        println!("Error: {}", e);
                        continue;
                    }
                };
                if let Some((_, instance)) = session.instance() {
                    let ranker = PriorityRanker::new(instance);
                    let order = ranker
                        .precedence_feasible_order(rule)
                        .iter()
                        .map(|id| id.to_string())
                        .collect::<Vec<_>>()
                        .join(",");
                    println!("{} order: {}", rule, order);
                }
            }
            "run" => match parts.next() {
                Some(rule_s) => session.run(rule_s),
                None => println!("Usage: run <rule>"),
            },
            "runall" => session.run_all(),
            "hint" => {
                let names: Vec<String> = rest
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                match search_order(&names) {
                    Ok(order) => {
                        let shown = order
                            .iter()
                            .map(|r| r.name())
                            .collect::<Vec<_>>()
                            .join(",");
                        session.hint = names;
                        println!("Search order: {}", shown);
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "features" => {
                if let Some((_, instance)) = session.instance() {
                    for (name, value) in FeatureVector::from_instance(instance).iter() {
                        println!("  {:<28} {:.4}", name, value);
                    }
                }
            }
            "verify" => {
                let Some(schedule) = &session.last_schedule else {
                    println!("No schedule yet. Use 'run <rule>' or 'runall'.");
                    continue;
                };
                if let Some((_, instance)) = session.instance() {
                    let violations = schedule.verify(instance);
                    if violations.is_empty() {
                        println!("Schedule OK: no violations.");
                    } else {
                        println!("{} violation(s):", violations.len());
                        for v in violations {
                            println!("  - {}", v);
                        }
                    }
                }
            }
            "config" => {
                let (sub, arg) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let sub = (!sub.is_empty()).then_some(sub);
                session.config(sub, arg.trim());
            }
            "save" => session.save(parts.next(), parts.next()),
            "report" => session.report(parts.next(), parts.next()),
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
