//! User-facing strings, keyed by message id and indexed by language.
//!
//! Every string the tool prints goes through [`tr`]. Adding a language means
//! adding a [`Language`] variant and one column to [`table`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Language for prompts and console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }

    fn column(self) -> usize {
        match self {
            Language::Zh => 0,
            Language::En => 1,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zh" => Ok(Self::Zh),
            "en" => Ok(Self::En),
            _ => Err(format!("Unknown language: {}", s)),
        }
    }
}

/// Message ids for everything printed to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    // Progress notices
    CheckingRepository,
    FetchingStatus,
    FetchingDiff,
    DiffTruncated,
    BuildingPrompt,
    WaitingForResponse,

    // File listing and confirmation
    FilesToCommit,
    StagedFiles,
    ModifiedFiles,
    DeletedFiles,
    UntrackedFiles,
    GeneratedMessage,
    ConfirmCommit,
    CommitCancelled,
    CommitSucceeded,
    ErrorPrefix,

    // Failures
    NotARepository,
    NoPendingChanges,
    NoFilesToCommit,
    Timeout,
    PayloadTooLarge,
    RemoteServiceError,
    EmptyCompletion,
    InvalidFormat,
    CommitFailure,
    MissingCredential,
    UnknownSubcommand,
    VcsFailure,
    ConfirmationFailed,
    ConfigFailure,

    // Config subcommand
    ConfigUsage,
    ApiKeySet,
    CurrentApiKey,
    ApiKeyUnset,
    MissingApiKeyValue,
}

/// Look up the text for `msg` in `lang`.
pub fn tr(lang: Language, msg: Msg) -> &'static str {
    table(msg)[lang.column()]
}

fn table(msg: Msg) -> [&'static str; 2] {
    match msg {
        Msg::CheckingRepository => ["正在检查 Git 仓库...", "Checking git repository..."],
        Msg::FetchingStatus => ["正在获取仓库状态...", "Fetching repository status..."],
        Msg::FetchingDiff => ["正在获取变更内容...", "Fetching diff..."],
        Msg::DiffTruncated => [
            "变更内容过长，已截断后发送",
            "Diff is too large and was truncated before sending",
        ],
        Msg::BuildingPrompt => ["正在构建提示信息...", "Building prompt..."],
        Msg::WaitingForResponse => [
            "正在等待 AI 生成提交信息...",
            "Waiting for the AI to generate a commit message...",
        ],

        Msg::FilesToCommit => ["\n将要提交的文件：", "\nFiles to be committed:"],
        Msg::StagedFiles => ["已暂存的文件：", "Staged files:"],
        Msg::ModifiedFiles => ["已修改的文件：", "Modified files:"],
        Msg::DeletedFiles => ["已删除的文件：", "Deleted files:"],
        Msg::UntrackedFiles => ["新增的文件：", "Untracked files:"],
        Msg::GeneratedMessage => ["\n生成的提交信息：", "\nGenerated commit message: "],
        Msg::ConfirmCommit => ["确认提交？(y/n)", "Confirm commit? (y/n)"],
        Msg::CommitCancelled => ["已取消提交", "Commit cancelled"],
        Msg::CommitSucceeded => ["提交成功！", "Commit successful!"],
        Msg::ErrorPrefix => ["错误：", "Error: "],

        Msg::NotARepository => ["当前目录不是有效的Git仓库", "Not a git repository"],
        Msg::NoPendingChanges => [
            "没有检测到需要提交的变更",
            "No changes detected to commit",
        ],
        Msg::NoFilesToCommit => ["没有可提交的文件", "No files to commit"],
        Msg::Timeout => [
            "AI 服务响应超时，请稍后重试",
            "The AI service did not respond in time, please try again later",
        ],
        Msg::PayloadTooLarge => [
            "变更内容过大，AI 服务无法处理，请减少变更后重试",
            "The change set is too large for the AI service, please retry with fewer changes",
        ],
        Msg::RemoteServiceError => ["AI服务错误：", "AI service error: "],
        Msg::EmptyCompletion => [
            "AI 未能生成有效的提交信息",
            "The AI did not return a commit message",
        ],
        Msg::InvalidFormat => [
            "AI 生成的提交信息格式无效：",
            "The AI returned a commit message in an invalid format: ",
        ],
        Msg::CommitFailure => ["提交失败：", "Commit failed: "],
        Msg::MissingCredential => [
            "请先设置 API 密钥。\n\n\
             您可以通过以下命令设置 API 密钥：\n\
             git-auto-commit config set-api-key <your-api-key>\n\n\
             如果您还没有 API 密钥，可以通过以下步骤获取：\n\
             1. 访问 https://siliconflow.cn\n\
             2. 注册/登录您的账号\n\
             3. 在控制台中创建 API 密钥",
            "Please set an API key first.\n\n\
             You can set it with:\n\
             git-auto-commit config set-api-key <your-api-key>\n\n\
             If you do not have an API key yet:\n\
             1. Visit https://siliconflow.cn\n\
             2. Sign up or log in\n\
             3. Create an API key in the console",
        ],
        Msg::UnknownSubcommand => ["未知的子命令：", "Unknown subcommand: "],
        Msg::VcsFailure => ["Git 操作失败：", "Git operation failed: "],
        Msg::ConfirmationFailed => ["读取确认输入失败：", "Failed to read confirmation: "],
        Msg::ConfigFailure => ["配置文件错误：", "Config error: "],

        Msg::ConfigUsage => [
            "使用方法：\n  \
             git-auto-commit config set-api-key <your-api-key>  设置 API 密钥\n  \
             git-auto-commit config get-api-key                 获取当前 API 密钥",
            "Usage:\n  \
             git-auto-commit config set-api-key <your-api-key>  Set the API key\n  \
             git-auto-commit config get-api-key                 Show the current API key",
        ],
        Msg::ApiKeySet => ["API 密钥已设置", "API key saved"],
        Msg::CurrentApiKey => ["当前 API 密钥：", "Current API key: "],
        Msg::ApiKeyUnset => ["API 密钥未设置", "API key is not set"],
        Msg::MissingApiKeyValue => ["请提供 API 密钥", "Please provide an API key"],
    }
}
