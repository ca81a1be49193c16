use crate::error::AppError;
use crate::notify::{Notice, Notifier};
use tauri_winrt_notification::Toast;

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError> {
        Toast::new(Toast::POWERSHELL_APP_ID)
            .title("todolist")
            .text1(&notice.message)
            .text2(notice.level().label())
            .show()
            .map_err(|err| AppError::io(err.to_string()))
    }
}
