use crate::hotkey::HotkeyEngine;
use anyhow::{anyhow, bail, Result};
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub type SharedEngine = Arc<Mutex<HotkeyEngine>>;

/// Engine the OS intercept forwards to. Set by [`KeyboardHook::install`],
/// cleared by [`KeyboardHook::uninstall`].
static ACTIVE_ENGINE: Lazy<Mutex<Option<SharedEngine>>> = Lazy::new(|| Mutex::new(None));

fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Forward a key transition to the installed engine.
///
/// Entry point for the hook procedure. Returns whether a bound action ran;
/// `false` when no hook is installed.
pub fn dispatch_key_transition(key_name: &str, is_down: bool) -> bool {
    let engine = match lock_recover(&ACTIVE_ENGINE).as_ref() {
        Some(engine) => Arc::clone(engine),
        None => return false,
    };
    let mut engine = lock_recover(&engine);
    engine.on_key_transition(key_name, is_down)
}

pub fn hook_is_active() -> bool {
    lock_recover(&ACTIVE_ENGINE).is_some()
}

/// Display names for keys whose OS key-name text is missing or ambiguous.
///
/// Names are already in the form [`normalize_key_name`] produces, so they
/// compare equal to the keys of a registered chord.
///
/// [`normalize_key_name`]: crate::chord::normalize_key_name
pub fn key_name_override(vk_code: u32) -> Option<&'static str> {
    match vk_code {
        0x5B => Some("Win"),        // VK_LWIN
        0x5C => Some("Right Win"),  // VK_RWIN
        0xA3 => Some("Right Ctrl"), // VK_RCONTROL
        0xA5 => Some("Right Alt"),  // VK_RMENU
        0x21 => Some("Pageup"),
        0x22 => Some("Pagedown"),
        0x24 => Some("Home"),
        0x23 => Some("End"),
        0x2D => Some("Insert"),
        0x2E => Some("Delete"),
        0x25 => Some("Left"),
        0x27 => Some("Right"),
        0x26 => Some("Up"),
        0x28 => Some("Down"),
        0x13 => Some("Pause"),
        0x90 => Some("Num Lock"),
        _ => None,
    }
}

pub trait HookBackend: Send {
    fn install(&mut self) -> Result<()>;
    fn uninstall(&mut self) -> Result<()>;
    fn is_installed(&self) -> bool;
}

/// Owns the system-wide keyboard intercept for one [`HotkeyEngine`].
pub struct KeyboardHook {
    engine: SharedEngine,
    backend: Box<dyn HookBackend>,
}

impl KeyboardHook {
    pub fn new(engine: SharedEngine) -> Self {
        Self::with_backend(engine, Box::new(DefaultHookBackend::default()))
    }

    pub fn with_backend(engine: SharedEngine, backend: Box<dyn HookBackend>) -> Self {
        Self { engine, backend }
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    /// Attach the engine to the OS intercept.
    ///
    /// Fails if this hook or any other is already installed; two intercepts
    /// would dispatch every chord twice.
    pub fn install(&mut self) -> Result<()> {
        if self.backend.is_installed() {
            bail!("keyboard hook already installed");
        }
        {
            let mut slot = lock_recover(&ACTIVE_ENGINE);
            if slot.is_some() {
                bail!("another keyboard hook is already installed");
            }
            lock_recover(&self.engine).release_all();
            *slot = Some(Arc::clone(&self.engine));
        }

        if let Err(err) = self.backend.install() {
            *lock_recover(&ACTIVE_ENGINE) = None;
            return Err(err);
        }
        tracing::info!("keyboard hook installed");
        Ok(())
    }

    pub fn uninstall(&mut self) -> Result<()> {
        if !self.backend.is_installed() {
            return Ok(());
        }
        // A backend that failed to detach may still be delivering events, so
        // the slot stays claimed until a later uninstall succeeds.
        self.backend.uninstall()?;
        {
            let mut slot = lock_recover(&ACTIVE_ENGINE);
            if slot
                .as_ref()
                .is_some_and(|engine| Arc::ptr_eq(engine, &self.engine))
            {
                *slot = None;
            }
        }
        lock_recover(&self.engine).release_all();
        tracing::info!("keyboard hook uninstalled");
        Ok(())
    }

    pub fn is_installed(&self) -> bool {
        self.backend.is_installed()
    }
}

impl Drop for KeyboardHook {
    fn drop(&mut self) {
        if let Err(err) = self.uninstall() {
            tracing::warn!(?err, "failed to uninstall keyboard hook");
        }
    }
}

/// Backend that never touches the OS; tests drive it through
/// [`dispatch_key_transition`].
#[derive(Clone, Default)]
pub struct MockHookBackend {
    state: Arc<MockHookState>,
}

#[derive(Default)]
struct MockHookState {
    installed: Mutex<bool>,
    install_count: AtomicUsize,
    uninstall_count: AtomicUsize,
    fail_install: Mutex<bool>,
    fail_uninstall: Mutex<bool>,
}

impl MockHookBackend {
    pub fn new() -> (Self, MockHookHandle) {
        let backend = Self::default();
        let handle = MockHookHandle {
            state: Arc::clone(&backend.state),
        };
        (backend, handle)
    }
}

impl HookBackend for MockHookBackend {
    fn install(&mut self) -> Result<()> {
        if *lock_recover(&self.state.fail_install) {
            return Err(anyhow!("mock hook install refused"));
        }
        *lock_recover(&self.state.installed) = true;
        self.state.install_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn uninstall(&mut self) -> Result<()> {
        if *lock_recover(&self.state.fail_uninstall) {
            return Err(anyhow!("mock hook uninstall refused"));
        }
        *lock_recover(&self.state.installed) = false;
        self.state.uninstall_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_installed(&self) -> bool {
        *lock_recover(&self.state.installed)
    }
}

pub struct MockHookHandle {
    state: Arc<MockHookState>,
}

impl MockHookHandle {
    pub fn install_count(&self) -> usize {
        self.state.install_count.load(Ordering::SeqCst)
    }

    pub fn uninstall_count(&self) -> usize {
        self.state.uninstall_count.load(Ordering::SeqCst)
    }

    pub fn set_fail_install(&self, fail: bool) {
        *lock_recover(&self.state.fail_install) = fail;
    }

    pub fn set_fail_uninstall(&self, fail: bool) {
        *lock_recover(&self.state.fail_uninstall) = fail;
    }
}

#[cfg(not(windows))]
#[derive(Default)]
pub struct DefaultHookBackend;

#[cfg(not(windows))]
impl HookBackend for DefaultHookBackend {
    fn install(&mut self) -> Result<()> {
        Err(anyhow!("global keyboard hooks are not supported on this platform"))
    }

    fn uninstall(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_installed(&self) -> bool {
        false
    }
}

#[cfg(windows)]
pub use platform::DefaultHookBackend;

#[cfg(windows)]
mod platform {
    use super::{dispatch_key_transition, key_name_override, HookBackend};
    use crate::chord::normalize_key_name;
    use anyhow::{anyhow, Result};
    use std::thread::JoinHandle;
    use std::time::Duration;
    use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        GetKeyNameTextW, MapVirtualKeyW, MAPVK_VK_TO_VSC,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        CallNextHookEx, HC_ACTION, HHOOK, KBDLLHOOKSTRUCT, WM_KEYDOWN, WM_KEYUP, WM_SYSKEYDOWN,
        WM_SYSKEYUP,
    };

    #[derive(Debug)]
    struct HookThread {
        thread_id: u32,
        join: JoinHandle<()>,
    }

    #[derive(Debug, Default)]
    pub struct DefaultHookBackend {
        hook_thread: Option<HookThread>,
    }

    unsafe impl Send for DefaultHookBackend {}

    impl HookBackend for DefaultHookBackend {
        fn install(&mut self) -> Result<()> {
            if self.hook_thread.is_some() {
                return Ok(());
            }

            use windows::Win32::System::LibraryLoader::GetModuleHandleW;
            use windows::Win32::System::Threading::GetCurrentThreadId;
            use windows::Win32::UI::WindowsAndMessaging::{
                DispatchMessageW, GetMessageW, PeekMessageW, SetWindowsHookExW, TranslateMessage,
                UnhookWindowsHookEx, MSG, PM_NOREMOVE, WH_KEYBOARD_LL,
            };

            let (ready_tx, ready_rx) = std::sync::mpsc::sync_channel::<Result<u32>>(1);

            let join = std::thread::spawn(move || {
                // Make sure the thread owns a message queue before hooking.
                let mut msg = MSG::default();
                unsafe {
                    let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
                }

                let thread_id = unsafe { GetCurrentThreadId() };
                let hmodule = match unsafe { GetModuleHandleW(None) } {
                    Ok(h) => h,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow!(err)));
                        return;
                    }
                };

                let keyboard_hook = match unsafe {
                    SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), hmodule, 0)
                } {
                    Ok(h) if !h.0.is_null() => h,
                    Ok(_) => {
                        let _ = ready_tx.send(Err(anyhow!(windows::core::Error::from_win32())));
                        return;
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow!(err)));
                        return;
                    }
                };

                let _ = ready_tx.send(Ok(thread_id));

                // WH_KEYBOARD_LL callbacks are delivered through this loop.
                loop {
                    let r = unsafe { GetMessageW(&mut msg, None, 0, 0) };
                    if r.0 <= 0 {
                        break;
                    }
                    unsafe {
                        let _ = TranslateMessage(&msg);
                        DispatchMessageW(&msg);
                    }
                }

                unsafe {
                    let _ = UnhookWindowsHookEx(keyboard_hook);
                }
            });

            let thread_id = ready_rx
                .recv_timeout(Duration::from_secs(2))
                .map_err(|_| anyhow!("keyboard hook thread did not signal readiness"))??;

            self.hook_thread = Some(HookThread { thread_id, join });
            Ok(())
        }

        fn uninstall(&mut self) -> Result<()> {
            if let Some(th) = self.hook_thread.take() {
                use windows::Win32::UI::WindowsAndMessaging::{PostThreadMessageW, WM_QUIT};
                let posted =
                    unsafe { PostThreadMessageW(th.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) };
                if let Err(err) = posted {
                    // The thread is still pumping with the hook attached; keep
                    // it so a later uninstall can stop and join it.
                    self.hook_thread = Some(th);
                    return Err(anyhow!("failed to stop keyboard hook thread: {err}"));
                }
                th.join
                    .join()
                    .map_err(|_| anyhow!("keyboard hook thread panicked"))?;
            }
            Ok(())
        }

        fn is_installed(&self) -> bool {
            self.hook_thread.is_some()
        }
    }

    /// Human-readable name for a virtual-key code, `None` if the OS has none.
    pub(super) fn key_name(vk_code: u32) -> Option<String> {
        if let Some(name) = key_name_override(vk_code) {
            return Some(name.to_string());
        }

        let scan_code = unsafe { MapVirtualKeyW(vk_code, MAPVK_VK_TO_VSC) };
        let mut buffer = [0u16; 128];
        let len = unsafe { GetKeyNameTextW((scan_code << 16) as i32, &mut buffer) };
        if len <= 0 {
            return None;
        }
        let name = String::from_utf16_lossy(&buffer[..len as usize]);
        let name = normalize_key_name(&name);
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    unsafe extern "system" fn keyboard_hook_proc(
        n_code: i32,
        w_param: WPARAM,
        l_param: LPARAM,
    ) -> LRESULT {
        if n_code == HC_ACTION as i32 {
            let msg = w_param.0 as u32;
            let is_down = match msg {
                WM_KEYDOWN | WM_SYSKEYDOWN => Some(true),
                WM_KEYUP | WM_SYSKEYUP => Some(false),
                _ => None,
            };
            if let Some(is_down) = is_down {
                let info = unsafe { &*(l_param.0 as *const KBDLLHOOKSTRUCT) };
                if let Some(name) = key_name(info.vkCode) {
                    dispatch_key_transition(&name, is_down);
                }
            }
        }

        // Always pass the event on, fired or not.
        unsafe { CallNextHookEx(HHOOK(std::ptr::null_mut()), n_code, w_param, l_param) }
    }
}
