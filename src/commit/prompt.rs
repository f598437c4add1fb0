//! Prompt construction for AI-generated commit messages.

use crate::git::{ChangeDiff, RepositoryStatus};
use crate::i18n::Language;

/// The two halves of a chat completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Fixed wording for one language.
struct Template {
    system: &'static str,
    intro: &'static str,
    status_heading: &'static str,
    new_files: &'static str,
    modified_files: &'static str,
    deleted_files: &'static str,
    renamed_files: &'static str,
    none: &'static str,
    separator: &'static str,
    diff_heading: &'static str,
    instructions: &'static str,
}

const ZH: Template = Template {
    system: "你是一个Git提交信息生成助手。你需要生成简洁、清晰、符合规范的中文提交信息。\n\
             提交信息格式必须是：<type>: <description>\n\
             其中type规则：\n\
             - feat：用于新增文件或新功能\n\
             - fix：用于修复问题或改进现有功能\n\
             description必须是中文，使用概括性描述，不要列出具体文件名。",
    intro: "请为以下Git变更生成提交信息：",
    status_heading: "变更状态：",
    new_files: "新增文件",
    modified_files: "修改文件",
    deleted_files: "删除文件",
    renamed_files: "重命名文件",
    none: "无",
    separator: "：",
    diff_heading: "变更内容：",
    instructions: "请生成一条简洁的中文提交信息，格式为 <type>: <description>。\n\
                   type必须是：feat（新功能）/fix（修复）之一。\n\
                   - 如果涉及新增文件或新功能，使用 feat\n\
                   - 如果是修复问题或改进现有功能，使用 fix\n\n\
                   要求：\n\
                   1. 找出最重要的变更，提交信息必须简洁，不超过20个字\n\
                   2. 不要列出具体的文件名，使用概括性的描述\n\
                   3. 根据变更内容选择最合适的type\n\
                   4. 只输出一行提交信息，不要输出任何其他内容",
};

const EN: Template = Template {
    system: "You are a Git commit message assistant. You write concise, clear commit messages in English.\n\
             The commit message format must be: <type>: <description>\n\
             Type rules:\n\
             - feat: for new files or new functionality\n\
             - fix: for bug fixes or improvements to existing functionality\n\
             The description must be in English, summarize the change, and must not list file names.",
    intro: "Generate a commit message for the following Git changes:",
    status_heading: "Change status:",
    new_files: "New files",
    modified_files: "Modified files",
    deleted_files: "Deleted files",
    renamed_files: "Renamed files",
    none: "none",
    separator: ": ",
    diff_heading: "Diff:",
    instructions: "Write one concise English commit message in the format <type>: <description>.\n\
                   type must be one of: feat (new feature) / fix (fix or improvement).\n\
                   - Use feat when the change adds files or new functionality\n\
                   - Use fix when the change repairs a problem or improves existing functionality\n\n\
                   Requirements:\n\
                   1. Identify the most significant changes and keep the message between 10 and 100 words\n\
                   2. Do not list file names, describe the change in general terms\n\
                   3. Pick the type that best fits the changes\n\
                   4. Output only the single commit message line and nothing else",
};

fn template(language: Language) -> &'static Template {
    match language {
        Language::Zh => &ZH,
        Language::En => &EN,
    }
}

/// Build the system instruction and user prompt for `language`.
///
/// Untracked and newly staged files are both listed as new files. The diff is
/// embedded as given, including any truncation marker.
pub fn build_prompt(status: &RepositoryStatus, diff: &ChangeDiff, language: Language) -> Prompt {
    let t = template(language);

    let mut new_files: Vec<String> = status
        .not_added
        .iter()
        .chain(&status.created)
        .cloned()
        .collect();
    new_files.sort_unstable();
    new_files.dedup();

    let renamed: Vec<String> = status
        .renamed
        .iter()
        .map(|r| format!("{} -> {}", r.from, r.to))
        .collect();

    let user = format!(
        "{intro}\n\n\
         {status_heading}\n\
         - {new_label}{sep}{new_files}\n\
         - {modified_label}{sep}{modified}\n\
         - {deleted_label}{sep}{deleted}\n\
         - {renamed_label}{sep}{renamed}\n\n\
         {diff_heading}\n\
         {diff}\n\n\
         {instructions}",
        intro = t.intro,
        status_heading = t.status_heading,
        new_label = t.new_files,
        modified_label = t.modified_files,
        deleted_label = t.deleted_files,
        renamed_label = t.renamed_files,
        sep = t.separator,
        new_files = join_or(&new_files, t.none),
        modified = join_or(&status.modified.iter().cloned().collect::<Vec<_>>(), t.none),
        deleted = join_or(&status.deleted.iter().cloned().collect::<Vec<_>>(), t.none),
        renamed = join_or(&renamed, t.none),
        diff_heading = t.diff_heading,
        diff = diff.text(),
        instructions = t.instructions,
    );

    Prompt {
        system: t.system.to_string(),
        user,
    }
}

fn join_or(paths: &[String], none: &str) -> String {
    if paths.is_empty() {
        none.to_string()
    } else {
        paths.join(", ")
    }
}
