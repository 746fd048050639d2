//! Tool registry: named descriptors for the external programs the dispatcher
//! can spawn, plus launch-command parsing (shell splitting rules).
//!
//! Descriptors are built once at startup, either from the built-in list or a
//! YAML tools file, and never mutated afterwards.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use shell_words::split as shell_split;
use std::fmt;
use std::path::Path;

/// Functional role a tool can fill for the file-oriented and chat operations.
///
/// Name lookup (`--server`) ignores roles; `analyze`, `format` and `chat`
/// resolve their tool by role instead of by a hard-coded name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolRole {
    Analyzer,
    Formatter,
    Assistant,
}

impl fmt::Display for ToolRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolRole::Analyzer => write!(f, "analyzer"),
            ToolRole::Formatter => write!(f, "formatter"),
            ToolRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A named external command-line program the dispatcher can invoke once per
/// call.
///
/// `command` is a shell-style launch line ("python3 /opt/tool/main.py" works);
/// it is split with shell rules at spawn time. `args` are appended after the
/// split command, before any operation-specific trailing arguments. The
/// per-operation argument contract is documented on the dispatcher operations
/// themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,

    /// Launch command line, split with shell-style rules at spawn time.
    pub command: String,

    /// Extra leading arguments appended after the launch command.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Tool version surfaced in `servers` output, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub description: String,

    /// Role this tool fills for analyze/format/chat, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ToolRole>,

    /// Flag inserted before inline payloads (code snippets, chat
    /// instructions), e.g. "-c" for python3. When absent the payload is
    /// passed as a bare trailing argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_flag: Option<String>,
}

impl ToolDescriptor {
    /// Split the launch command into (program, leading arguments), with the
    /// descriptor's extra `args` appended.
    pub fn launch(&self) -> Result<(String, Vec<String>)> {
        let parts = shell_split(self.command.trim())
            .with_context(|| format!("failed to parse launch command for tool '{}'", self.name))?;
        let Some((program, rest)) = parts.split_first() else {
            bail!("tool '{}' has an empty launch command", self.name);
        };
        if program.is_empty() {
            bail!("tool '{}' has an empty program name", self.name);
        }
        let mut args = rest.to_vec();
        args.extend(self.args.iter().cloned());
        Ok((program.clone(), args))
    }
}

/// Ordered, immutable collection of tool descriptors keyed by unique name.
#[derive(Debug, Clone)]
pub struct Registry {
    tools: Vec<ToolDescriptor>,
}

impl Registry {
    /// Validate and wrap a descriptor list. Registration order is preserved.
    pub fn new(tools: Vec<ToolDescriptor>) -> Result<Self> {
        for (idx, tool) in tools.iter().enumerate() {
            if tool.name.trim().is_empty() {
                bail!("tool #{} has an empty name", idx + 1);
            }
            // Launch parse errors surface here rather than at first spawn.
            tool.launch()?;
            if tools[..idx]
                .iter()
                .any(|t| t.name.eq_ignore_ascii_case(&tool.name))
            {
                bail!("duplicate tool name '{}'", tool.name);
            }
        }
        Ok(Self { tools })
    }

    /// The default registry, mirroring the tools the hosted dev environment
    /// ships with.
    pub fn builtin() -> Self {
        let tools = vec![
            ToolDescriptor {
                name: "typescript".into(),
                command: "node".into(),
                args: vec![],
                version: Some("5.3.3".into()),
                description: "TypeScript/JavaScript snippet runner (node)".into(),
                role: None,
                code_flag: Some("-e".into()),
            },
            ToolDescriptor {
                name: "python".into(),
                command: "python3".into(),
                args: vec![],
                version: Some("3.12.0".into()),
                description: "Python 3 snippet runner".into(),
                role: None,
                code_flag: Some("-c".into()),
            },
            ToolDescriptor {
                name: "python-code-analyzer".into(),
                command: "python3".into(),
                args: vec!["/opt/code-analyzer/main.py".into()],
                version: None,
                description: "Python code analysis and refactoring tool".into(),
                role: Some(ToolRole::Analyzer),
                code_flag: None,
            },
            ToolDescriptor {
                name: "auto-formatter".into(),
                command: "python3".into(),
                args: vec!["/opt/auto-formatter/main.py".into()],
                version: None,
                description: "Code formatting with best practices".into(),
                role: Some(ToolRole::Formatter),
                code_flag: None,
            },
            ToolDescriptor {
                name: "assistant".into(),
                command: "python3".into(),
                args: vec!["/opt/code-assistant/main.py".into()],
                version: None,
                description: "AI coding assistant for chat-style requests".into(),
                role: Some(ToolRole::Assistant),
                code_flag: None,
            },
        ];
        // The built-in list is static and valid by construction.
        Self { tools }
    }

    /// Load a registry from a YAML file containing a list of descriptors.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read tools file: {}", path.display()))?;
        let tools: Vec<ToolDescriptor> =
            serde_yaml::from_str(&raw).context("failed to parse tools file YAML")?;
        Self::new(tools)
    }

    /// Find a tool by name (case-insensitive match).
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// First tool registered with the given role, in registration order.
    pub fn by_role(&self, role: ToolRole) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.role == Some(role))
    }

    /// All descriptors, in registration order.
    pub fn all(&self) -> &[ToolDescriptor] {
        &self.tools
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, command: &str) -> ToolDescriptor {
        ToolDescriptor {
            name: name.into(),
            command: command.into(),
            args: vec![],
            version: None,
            description: String::new(),
            role: None,
            code_flag: None,
        }
    }

    #[test]
    fn launch_splits_command_line() {
        let d = descriptor("demo", "python3 /opt/tool/main.py --fast");
        let (program, args) = d.launch().unwrap();
        assert_eq!(program, "python3");
        assert_eq!(args, vec!["/opt/tool/main.py", "--fast"]);
    }

    #[test]
    fn launch_respects_quoting_and_extra_args() {
        let mut d = descriptor("demo", r#"runner "a b""#);
        d.args = vec!["--flag".into()];
        let (program, args) = d.launch().unwrap();
        assert_eq!(program, "runner");
        assert_eq!(args, vec!["a b", "--flag"]);
    }

    #[test]
    fn empty_launch_command_rejected() {
        let d = descriptor("demo", "   ");
        assert!(d.launch().is_err());
        assert!(Registry::new(vec![d]).is_err());
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = Registry::new(vec![descriptor("Echo", "echo"), descriptor("echo", "echo")])
            .unwrap_err();
        assert!(err.to_string().contains("duplicate tool name"));
    }

    #[test]
    fn get_is_case_insensitive() {
        let reg = Registry::new(vec![descriptor("TypeScript", "node")]).unwrap();
        assert!(reg.get("typescript").is_some());
        assert!(reg.get("ruby").is_none());
    }

    #[test]
    fn builtin_covers_all_roles_in_order() {
        let reg = Registry::builtin();
        assert_eq!(reg.by_role(ToolRole::Analyzer).unwrap().name, "python-code-analyzer");
        assert_eq!(reg.by_role(ToolRole::Formatter).unwrap().name, "auto-formatter");
        assert_eq!(reg.by_role(ToolRole::Assistant).unwrap().name, "assistant");
        let names: Vec<_> = reg.all().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names[0], "typescript");
        assert_eq!(names[1], "python");
    }

    #[test]
    fn version_serialized_only_when_known() {
        let reg = Registry::builtin();
        let json = serde_json::to_value(reg.all()).unwrap();
        assert_eq!(json[0]["version"], "5.3.3");
        assert_eq!(json[1]["version"], "3.12.0");
        assert!(json[2].get("version").is_none());
    }

    #[test]
    fn yaml_round_trip() {
        let yaml = r#"
- name: echo
  command: /bin/echo
  description: echo back
- name: fmt
  command: sh
  args: ["-c", "cat"]
  role: formatter
"#;
        let tools: Vec<ToolDescriptor> = serde_yaml::from_str(yaml).unwrap();
        let reg = Registry::new(tools).unwrap();
        assert_eq!(reg.all().len(), 2);
        assert_eq!(reg.by_role(ToolRole::Formatter).unwrap().name, "fmt");
    }
}
