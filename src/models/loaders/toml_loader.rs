use crate::error::{AppError, AppResult, FileError};
use crate::models::identity::Identity;
use crate::models::request::{SubmissionRequest, UsersFile};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载一个提交请求
///
/// `fasta_file` 为相对路径时相对于请求文件所在目录解析，读取为原始字节，
/// 编码问题留给提交流程报告
pub async fn load_submission_request(toml_file_path: &Path) -> AppResult<SubmissionRequest> {
    let content = read_file(toml_file_path).await?;

    let mut request: SubmissionRequest = toml::from_str(&content).map_err(|e| {
        AppError::File(FileError::TomlParseFailed {
            path: toml_file_path.display().to_string(),
            source: e,
        })
    })?;

    request.raw = match (&request.fasta, &request.fasta_file) {
        (Some(text), _) => text.clone().into_bytes(),
        (None, Some(fasta_file)) => {
            let fasta_path = resolve_relative(toml_file_path, fasta_file);
            fs::read(&fasta_path)
                .await
                .map_err(|e| AppError::file_read_failed(fasta_path.display().to_string(), e))?
        }
        (None, None) => {
            return Err(AppError::File(FileError::MissingField {
                path: toml_file_path.display().to_string(),
                field: "fasta".to_string(),
            }))
        }
    };

    request.file_path = Some(toml_file_path.to_path_buf());

    Ok(request)
}

/// 从文件夹中加载所有提交请求（按文件名排序）
///
/// 单个文件加载失败只记录警告，不影响其他请求
pub async fn load_all_requests(folder_path: &str) -> AppResult<Vec<SubmissionRequest>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(AppError::File(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }));
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut requests = Vec::with_capacity(toml_files.len());
    for path in toml_files {
        tracing::debug!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_submission_request(&path).await {
            Ok(request) => requests.push(request),
            Err(e) => tracing::warn!("加载请求文件失败 {}: {}", path.display(), e),
        }
    }

    Ok(requests)
}

/// 加载用户列表
pub async fn load_users(users_file_path: &Path) -> AppResult<Vec<Identity>> {
    let content = read_file(users_file_path).await?;

    let file: UsersFile = toml::from_str(&content).map_err(|e| {
        AppError::File(FileError::TomlParseFailed {
            path: users_file_path.display().to_string(),
            source: e,
        })
    })?;

    Ok(file.users)
}

async fn read_file(path: &Path) -> AppResult<String> {
    if !path.exists() {
        return Err(AppError::File(FileError::NotFound {
            path: path.display().to_string(),
        }));
    }

    fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))
}

fn resolve_relative(base_file: &Path, relative: &Path) -> PathBuf {
    if relative.is_absolute() {
        return relative.to_path_buf();
    }
    base_file
        .parent()
        .map(|dir| dir.join(relative))
        .unwrap_or_else(|| relative.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::identity::UserId;

    async fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "sequence_submit_loader_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir).await;
        fs::create_dir_all(&dir).await.unwrap();
        dir
    }

    #[tokio::test]
    async fn test_load_inline_request() {
        let dir = scratch_dir("inline").await;
        let path = dir.join("a.toml");
        fs::write(&path, "username = \"alice\"\nfasta = \">s1\\nACDE\\n\"\n")
            .await
            .unwrap();

        let request = load_submission_request(&path).await.unwrap();
        assert_eq!(request.username, "alice");
        assert_eq!(request.raw, b">s1\nACDE\n".to_vec());
        assert_eq!(request.name(), "a.toml");
    }

    #[tokio::test]
    async fn test_load_request_with_fasta_file() {
        let dir = scratch_dir("file").await;
        fs::write(dir.join("batch.fasta"), b">s1\nAC\xffDE\n")
            .await
            .unwrap();
        let path = dir.join("b.toml");
        fs::write(&path, "username = \"bob\"\nfasta_file = \"batch.fasta\"\n")
            .await
            .unwrap();

        let request = load_submission_request(&path).await.unwrap();
        assert_eq!(request.raw, b">s1\nAC\xffDE\n".to_vec());
    }

    #[tokio::test]
    async fn test_request_without_sequences_is_rejected() {
        let dir = scratch_dir("missing").await;
        let path = dir.join("c.toml");
        fs::write(&path, "username = \"carol\"\n").await.unwrap();

        let err = load_submission_request(&path).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::File(FileError::MissingField { ref field, .. }) if field == "fasta"
        ));
    }

    #[tokio::test]
    async fn test_load_all_requests_sorted_and_skips_broken() {
        let dir = scratch_dir("all").await;
        fs::write(dir.join("2.toml"), "username = \"b\"\nfasta = \">x\\nAC\"\n")
            .await
            .unwrap();
        fs::write(dir.join("1.toml"), "username = \"a\"\nfasta = \">x\\nAC\"\n")
            .await
            .unwrap();
        fs::write(dir.join("3.toml"), "not toml at all =").await.unwrap();
        fs::write(dir.join("notes.txt"), "ignored").await.unwrap();

        let requests = load_all_requests(&dir.to_string_lossy()).await.unwrap();
        let names: Vec<_> = requests.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_load_users() {
        let dir = scratch_dir("users").await;
        let path = dir.join("users.toml");
        fs::write(
            &path,
            "[[users]]\nid = 1\nusername = \"alice\"\nemail_verified = true\n\n[[users]]\nid = 2\nusername = \"bob\"\n",
        )
        .await
        .unwrap();

        let users = load_users(&path).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, UserId(1));
        assert!(users[0].email_verified);
        assert!(!users[1].email_verified);
    }

    #[tokio::test]
    async fn test_missing_folder() {
        let err = load_all_requests("/definitely/not/here").await.unwrap_err();
        assert!(matches!(err, AppError::File(FileError::DirectoryNotFound { .. })));
    }
}
