use super::with_client;
use crate::cli::FilesArgs;
use crate::config::AppConfig;
use crate::error::Result;
use tamarind::workflows::manage::JobManager;
use tracing::info;

pub async fn run(args: FilesArgs, config: &AppConfig) -> Result<()> {
    let FilesArgs {
        folder,
        all,
        delete,
    } = args;

    let listed = with_client(config, move |api, _cancel| {
        let manager = JobManager::new(api);
        match (delete, folder.as_deref(), all) {
            (true, Some(folder), _) => {
                manager.delete_folder(folder)?;
                Ok(vec![format!("{}/", folder)])
            }
            (true, None, true) => {
                let entries = manager.list_all_files()?;
                manager.delete_all_files()?;
                Ok(entries)
            }
            (true, None, false) => {
                let files = manager.list_files(None)?;
                for file in &files {
                    manager.delete_file(file)?;
                }
                Ok(files)
            }
            (false, folder, false) => Ok(manager.list_files(folder)?),
            (false, _, true) => Ok(manager.list_all_files()?),
        }
    })
    .await?;

    if delete {
        info!("Deleted {} entries", listed.len());
        for entry in &listed {
            println!("deleted {}", entry);
        }
    } else if listed.is_empty() {
        println!("No files found.");
    } else {
        for entry in &listed {
            println!("{}", entry);
        }
    }
    Ok(())
}
