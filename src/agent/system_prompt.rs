//! System prompt builder.
//!
//! Sections (in order):
//! 1. Role and goal
//! 2. Working philosophy
//! 3. Available tools
//! 4. Output contract

use crate::tools::ToolDefinition;
use tracing::debug;

const ROLE: &str = r#"
# Role & Goal

You are a senior autonomous software agent. Your goal is to solve the user's
request by forming a plan and executing it with the available tools.
You operate in a loop of Thought -> Action -> Observation.
"#;

const PHILOSOPHY: &str = r#"
# Core Philosophy

1. **Plan:** Start by writing a clear, step-by-step plan.
2. **Workspace:** Create a working directory (for example `./workspace`) for each new task.
   Get code and data with `git_clone` or `download_file` and work inside that directory.
3. **Explore & Debug:** Use `list_files`, `find_files_recursively` and `read_file_lines` to
   understand the code. Use `run_python_file` and `run_shell_command` to test and debug.
4. **Self-Correction:** Observations starting with `[ERROR]` mean the action failed.
   Analyze the error, revise the plan, and try again.
5. **Modify Code:** Use `replace_code_block` for targeted edits or `write_file` to rewrite a file.
6. **Cleanup:** Use `remove_directory` to clean up the workspace at the end if appropriate.
"#;

const OUTPUT_CONTRACT: &str = r#"
# Output Format

When you have the final answer that addresses the user's entire request, reply with
it directly, without extra text and without calling any tool.
"#;

/// Build the system prompt for a task run.
pub fn build_system_prompt(tools: &[ToolDefinition]) -> String {
    let mut prompt = String::with_capacity(4096);

    prompt.push_str(ROLE);
    prompt.push('\n');

    prompt.push_str(PHILOSOPHY);
    prompt.push('\n');

    if !tools.is_empty() {
        prompt.push_str("# Available Tools\n\n");
        for tool in tools {
            prompt.push_str(&format!("- `{}`: {}\n", tool.name, tool.description));
        }
        prompt.push('\n');
    }

    prompt.push_str(OUTPUT_CONTRACT);

    debug!("System prompt: {} chars", prompt.len());
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tool_definitions;

    #[test]
    fn test_prompt_lists_every_tool() {
        let tools = tool_definitions();
        let prompt = build_system_prompt(&tools);
        for tool in &tools {
            assert!(prompt.contains(&format!("`{}`", tool.name)), "{}", tool.name);
        }
    }

    #[test]
    fn test_prompt_sections_in_order() {
        let prompt = build_system_prompt(&tool_definitions());
        let role = prompt.find("# Role & Goal").unwrap();
        let tools = prompt.find("# Available Tools").unwrap();
        let output = prompt.find("# Output Format").unwrap();
        assert!(role < tools && tools < output);
    }

    #[test]
    fn test_prompt_without_tools_skips_section() {
        let prompt = build_system_prompt(&[]);
        assert!(!prompt.contains("# Available Tools"));
        assert!(prompt.contains("# Output Format"));
    }
}
