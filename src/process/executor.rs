use super::heredoc::{self, HeredocError};
use super::redirect::{self, RedirectError, SavedStreams};
use super::signal::{self, SignalMode};
use super::sys::{self, Fork};
use super::{ProcessError, WaitOutcome};
use crate::core::commands::Builtins;
use crate::parser::{Command, Node};
use crate::path::resolve_command;
use crate::shell::ShellContext;
use std::ffi::CString;
use std::io;
use std::os::fd::{AsRawFd, OwnedFd};
use std::os::unix::ffi::OsStringExt;

/// Everything `execve` needs, allocated before forking.
struct ExecPlan {
    name: String,
    path: Option<CString>,
    argv: Vec<CString>,
    envp: Vec<CString>,
}

impl ExecPlan {
    fn prepare(argv: &[String], ctx: &ShellContext) -> Result<Self, String> {
        let name = argv.first().cloned().unwrap_or_default();
        let path = resolve_command(&name, ctx.env.get("PATH"))
            .and_then(|p| CString::new(p.into_os_string().into_vec()).ok());
        let argv = argv
            .iter()
            .map(|arg| CString::new(arg.as_bytes()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| format!("{}: argument contains a NUL byte", name))?;

        Ok(Self {
            name,
            path,
            argv,
            envp: ctx.env.to_envp(),
        })
    }

    fn exec(&self) -> ! {
        if let Some(path) = &self.path {
            let err = sys::execve(path, &self.argv, &self.envp);
            tracing::debug!(command = %self.name, "execve failed: {}", err);
        }
        eprintln!("vena: {}: command not found", self.name);
        sys::exit_child(127)
    }
}

fn release(cmd: &mut Command) {
    cmd.release_heredocs();
}

/// Flatten a left-deep pipeline into its stages, leftmost first.
fn collect_stages<'n>(node: &'n mut Node, stages: &mut Vec<&'n mut Node>) {
    match node {
        Node::Pipeline { left, right } => {
            collect_stages(left, stages);
            stages.push(&mut **right);
        }
        other => stages.push(other),
    }
}

fn wire_stage(pipes: &[(OwnedFd, OwnedFd)], index: usize) -> io::Result<()> {
    if index > 0 {
        sys::dup2(pipes[index - 1].0.as_raw_fd(), libc::STDIN_FILENO)?;
    }
    if index < pipes.len() {
        sys::dup2(pipes[index].1.as_raw_fd(), libc::STDOUT_FILENO)?;
    }
    Ok(())
}

fn report_redirect(err: &RedirectError) {
    if !matches!(err, RedirectError::Interrupted) {
        eprintln!("vena: {}", err);
    }
}

/// Walks a parsed line and runs it. Builtins run in this process; all
/// else runs in forked children.
#[derive(Debug, Default)]
pub struct Executor {
    builtins: Builtins,
}

impl Executor {
    pub fn new() -> Self {
        Self {
            builtins: Builtins::new(),
        }
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    /// Capture every heredoc of the line, then evaluate it. An interrupted
    /// capture cancels the whole line with status 130.
    pub fn run(&self, root: &mut Node, ctx: &mut ShellContext) -> i32 {
        let status = match heredoc::realize_all(root, ctx.interactive) {
            Ok(()) => self.execute(root, ctx),
            Err(HeredocError::Interrupted) => 130,
            Err(e) => {
                eprintln!("vena: {}", e);
                1
            }
        };
        ctx.last_status = status;
        status
    }

    pub fn execute(&self, node: &mut Node, ctx: &mut ShellContext) -> i32 {
        let status = match node {
            Node::Command(cmd) => self.run_command(cmd, ctx),
            Node::Pipeline { .. } => self.run_pipeline(node, ctx),
            Node::And { left, right } => {
                let status = self.execute(left, ctx);
                if status == 0 && ctx.exit_requested().is_none() {
                    self.execute(right, ctx)
                } else {
                    status
                }
            }
            Node::Or { left, right } => {
                let status = self.execute(left, ctx);
                if status != 0 && ctx.exit_requested().is_none() {
                    self.execute(right, ctx)
                } else {
                    status
                }
            }
            Node::Sequence { left, right } => {
                let status = self.execute(left, ctx);
                if ctx.exit_requested().is_some() {
                    status
                } else {
                    self.execute(right, ctx)
                }
            }
            Node::Background { left, right } => {
                self.run_background(left, right.as_deref_mut(), ctx)
            }
            Node::Subshell { body } => self.run_subshell(body, ctx),
        };
        ctx.last_status = status;
        status
    }

    fn run_command(&self, cmd: &mut Command, ctx: &mut ShellContext) -> i32 {
        match cmd.name() {
            Some(name) if !self.builtins.is_builtin(name) => self.spawn(cmd, ctx),
            _ => self.run_in_shell(cmd, ctx),
        }
    }

    /// A builtin, or a command made only of redirections. The shell's own
    /// streams are restored afterwards.
    fn run_in_shell(&self, cmd: &mut Command, ctx: &mut ShellContext) -> i32 {
        let saved = match SavedStreams::save() {
            Ok(saved) => saved,
            Err(e) => {
                eprintln!("vena: {}", sys::os_message(&e));
                return 1;
            }
        };

        let status = match redirect::apply(&cmd.redirections) {
            Ok(()) => self.builtins.run(&cmd.argv, ctx).unwrap_or(0),
            Err(e) => {
                report_redirect(&e);
                e.status()
            }
        };

        drop(saved);
        cmd.release_heredocs();
        status
    }

    fn spawn(&self, cmd: &mut Command, ctx: &mut ShellContext) -> i32 {
        let plan = match ExecPlan::prepare(&cmd.argv, ctx) {
            Ok(plan) => plan,
            Err(msg) => {
                eprintln!("vena: {}", msg);
                return 1;
            }
        };

        match sys::fork() {
            Ok(Fork::Child) => {
                Self::enter_child(ctx);
                Self::exec_command(cmd, &plan)
            }
            Ok(Fork::Parent(pid)) => {
                tracing::debug!(pid, command = %plan.name, "spawned");
                cmd.release_heredocs();
                Self::wait_foreground(pid, true)
            }
            Err(e) => {
                eprintln!("vena: {}", ProcessError::Fork(e));
                1
            }
        }
    }

    fn run_pipeline(&self, node: &mut Node, ctx: &mut ShellContext) -> i32 {
        let mut stages = Vec::new();
        collect_stages(node, &mut stages);
        let count = stages.len();

        let mut pipes = Vec::with_capacity(count - 1);
        for _ in 1..count {
            match sys::pipe() {
                Ok(pipe) => pipes.push(pipe),
                Err(e) => {
                    eprintln!("vena: {}", ProcessError::Pipe(e));
                    return 1;
                }
            }
        }

        let mut pids = Vec::with_capacity(count);
        for (index, stage) in stages.into_iter().enumerate() {
            match sys::fork() {
                Ok(Fork::Child) => {
                    Self::enter_child(ctx);
                    let wired = wire_stage(&pipes, index);
                    pipes.clear();
                    if let Err(e) = wired {
                        eprintln!("vena: dup2: {}", sys::os_message(&e));
                        sys::exit_child(1);
                    }
                    self.run_stage(stage, ctx)
                }
                Ok(Fork::Parent(pid)) => {
                    stage.for_each_command_mut(&mut release);
                    pids.push(pid);
                }
                Err(e) => {
                    eprintln!("vena: {}", ProcessError::Fork(e));
                    break;
                }
            }
        }
        tracing::debug!(stages = count, started = pids.len(), "pipeline running");

        // Every write end must be gone before waiting or readers never see EOF.
        drop(pipes);

        let mut status = 1;
        for (index, &pid) in pids.iter().enumerate() {
            let last = index + 1 == count;
            let stage_status = Self::wait_foreground(pid, last);
            if last {
                status = stage_status;
            }
        }
        status
    }

    /// Body of a pipeline child. External commands replace the child
    /// directly; anything else is evaluated here and the child exits.
    fn run_stage(&self, stage: &mut Node, ctx: &mut ShellContext) -> ! {
        match stage {
            Node::Command(cmd) if cmd.name().is_some_and(|n| !self.builtins.is_builtin(n)) => {
                match ExecPlan::prepare(&cmd.argv, ctx) {
                    Ok(plan) => Self::exec_command(cmd, &plan),
                    Err(msg) => {
                        eprintln!("vena: {}", msg);
                        sys::exit_child(1)
                    }
                }
            }
            other => {
                let status = self.execute(other, ctx);
                sys::exit_child(status)
            }
        }
    }

    fn run_background(
        &self,
        left: &mut Node,
        right: Option<&mut Node>,
        ctx: &mut ShellContext,
    ) -> i32 {
        match sys::fork() {
            Ok(Fork::Child) => {
                ctx.interactive = false;
                ctx.in_background = true;
                let _ = sys::setpgid(0, 0);
                if let Err(e) = signal::install(SignalMode::Background) {
                    tracing::warn!("{}", e);
                }
                let status = self.execute(left, ctx);
                sys::exit_child(status)
            }
            Ok(Fork::Parent(pid)) => {
                // Both sides set the group so neither order of events races.
                let _ = sys::setpgid(pid, pid);
                left.for_each_command_mut(&mut release);
                if ctx.interactive && !ctx.quiet {
                    eprintln!("[bg] {}", pid);
                }
                tracing::debug!(pid, "background job started");
                sys::reclaim_terminal();

                match right {
                    Some(right) => self.execute(right, ctx),
                    None => 0,
                }
            }
            Err(e) => {
                eprintln!("vena: {}", ProcessError::Fork(e));
                1
            }
        }
    }

    fn run_subshell(&self, body: &mut Node, ctx: &mut ShellContext) -> i32 {
        match sys::fork() {
            Ok(Fork::Child) => {
                Self::enter_child(ctx);
                let status = self.execute(body, ctx);
                sys::exit_child(status)
            }
            Ok(Fork::Parent(pid)) => {
                body.for_each_command_mut(&mut release);
                Self::wait_foreground(pid, true)
            }
            Err(e) => {
                eprintln!("vena: {}", ProcessError::Fork(e));
                1
            }
        }
    }

    fn enter_child(ctx: &mut ShellContext) {
        ctx.interactive = false;
        if let Err(e) = signal::install(signal::child_mode(ctx.in_background)) {
            tracing::warn!("{}", e);
        }
    }

    fn exec_command(cmd: &Command, plan: &ExecPlan) -> ! {
        if let Err(e) = redirect::apply(&cmd.redirections) {
            report_redirect(&e);
            sys::exit_child(e.status());
        }
        plan.exec()
    }

    fn wait_foreground(pid: libc::pid_t, report: bool) -> i32 {
        if let Err(e) = signal::install(SignalMode::Foreground) {
            tracing::warn!("{}", e);
        }
        match sys::waitpid(pid) {
            Ok(raw) => {
                let outcome = WaitOutcome::from_raw(raw);
                tracing::debug!(pid, ?outcome, "child finished");
                if report {
                    outcome.report();
                }
                outcome.status()
            }
            Err(e) => {
                eprintln!("vena: {}", ProcessError::Wait(e));
                1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::env::EnvStore;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn tree(line: &str) -> Node {
        parse(&tokenize(line).unwrap()).unwrap().unwrap()
    }

    #[test]
    fn test_collect_stages_order() {
        let mut node = tree("a | b | c");
        let mut stages = Vec::new();
        collect_stages(&mut node, &mut stages);
        let names: Vec<String> = stages.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["(cmd a)", "(cmd b)", "(cmd c)"]);
    }

    #[test]
    fn test_exec_plan_rejects_nul() {
        let ctx = ShellContext::new(EnvStore::new());
        let err = ExecPlan::prepare(&["echo".into(), "a\0b".into()], &ctx)
            .err()
            .unwrap();
        assert_eq!(err, "echo: argument contains a NUL byte");
    }

    #[test]
    fn test_exec_plan_unresolved_name() {
        let mut env = EnvStore::new();
        env.set("PATH", "").unwrap();
        let ctx = ShellContext::new(env);
        let plan = ExecPlan::prepare(&["vena-no-such-command".into()], &ctx).unwrap();
        assert!(plan.path.is_none());
        assert_eq!(plan.argv.len(), 1);
    }
}
