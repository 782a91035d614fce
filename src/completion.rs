//! # Shell Completion Module
//!
//! Completion scripts via `clap_complete`. The bash and fish scripts also
//! complete `remove --key serviceName --value` with the service names found
//! in the history, by calling the hidden `listenlog complete-services`.
//!
//! ```bash
//! listenlog completion bash > ~/.local/share/bash-completion/completions/listenlog
//! listenlog completion fish > ~/.config/fish/completions/listenlog.fish
//! listenlog completion zsh > ~/.config/zsh/completions/_listenlog
//! ```

use crate::cli::Shell;
use crate::db::HistoryStore;
use anyhow::Result;
use clap::Command;
use clap_complete::{generate, Shell as CompletionShell};
use std::collections::BTreeSet;
use std::io::{self, Write};

/// Wraps the generated `_listenlog` function so service names are offered
/// after `--value` when the key is `serviceName`.
const BASH_SERVICE_COMPLETION: &str = r#"
# Service name completion for `listenlog remove --key serviceName --value`
_listenlog_with_services() {
    local cur="${COMP_WORDS[COMP_CWORD]}"
    local prev="${COMP_WORDS[COMP_CWORD-1]}"
    if [[ "$prev" == "--value" && " ${COMP_WORDS[*]} " == *" serviceName "* ]]; then
        local IFS=$'\n'
        COMPREPLY=($(compgen -W "$(listenlog complete-services 2>/dev/null)" -- "$cur"))
        return 0
    fi
    _listenlog "$@"
}
complete -F _listenlog_with_services -o nosort -o bashdefault -o default listenlog
"#;

const FISH_SERVICE_COMPLETION: &str = r#"
# Service name completion for `listenlog remove --key serviceName --value`
complete -c listenlog -n '__fish_seen_subcommand_from remove; and contains -- serviceName (commandline -opc)' -l value -r -f -a '(listenlog complete-services 2>/dev/null)'
"#;

pub fn shell_to_completion_shell(shell: Shell) -> CompletionShell {
    match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    }
}

/// Write the completion script for `shell` to `out`.
pub fn write_completions(shell: Shell, cmd: &mut Command, out: &mut dyn Write) -> Result<()> {
    let name = cmd.get_name().to_string();
    generate(shell_to_completion_shell(shell), cmd, name, out);

    match shell {
        Shell::Bash => out.write_all(BASH_SERVICE_COMPLETION.as_bytes())?,
        Shell::Fish => out.write_all(FISH_SERVICE_COMPLETION.as_bytes())?,
        Shell::Zsh | Shell::PowerShell | Shell::Elvish => {}
    }
    Ok(())
}

/// Generate shell completions for the given shell on stdout
pub fn generate_completions(shell: Shell, cmd: &mut Command) -> Result<()> {
    write_completions(shell, cmd, &mut io::stdout().lock())
}

/// Distinct service names present in the history, sorted.
pub fn service_completions(store: &HistoryStore) -> Result<Vec<String>> {
    let services: BTreeSet<String> = store
        .get_all()?
        .into_iter()
        .map(|entry| entry.service_name)
        .filter(|name| !name.is_empty())
        .collect();
    Ok(services.into_iter().collect())
}

/// Print service names one per line; the scripts split on newlines only.
pub fn print_service_completions(store: &HistoryStore) -> Result<()> {
    let mut out = io::stdout().lock();
    for name in service_completions(store)? {
        writeln!(out, "{name}")?;
    }
    Ok(())
}
