use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    pkgplane completions bash > ~/.bash_completion.d/pkgplane\n\n\
                  Generate zsh completions:\n    pkgplane completions zsh > ~/.zfunc/_pkgplane\n\n\
                  Generate fish completions:\n    pkgplane completions fish > ~/.config/fish/completions/pkgplane.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
