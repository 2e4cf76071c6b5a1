//! Shell icon extraction for Windows executables.
//!
//! Asks the shell for the icon associated with a file and converts the
//! returned HICON into an [`RgbaImage`]. When the file itself yields no
//! icon, the generic file-type icon is requested instead.

use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use image::RgbaImage;
use log::debug;
use windows_sys::Win32::Graphics::Gdi::{
    BI_RGB, BITMAP, BITMAPINFO, BITMAPINFOHEADER, DIB_RGB_COLORS, DeleteObject, GetDC, GetDIBits,
    GetObjectW, ReleaseDC,
};
use windows_sys::Win32::Storage::FileSystem::FILE_ATTRIBUTE_NORMAL;
use windows_sys::Win32::UI::Shell::{
    SHFILEINFOW, SHGFI_ICON, SHGFI_LARGEICON, SHGFI_USEFILEATTRIBUTES, SHGetFileInfoW,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{DestroyIcon, GetIconInfo, HICON, ICONINFO};

/// Resolve the shell icon for `path`, falling back to the generic
/// file-type icon. `None` means the shell had nothing to offer.
pub fn extract_shell_icon(path: &Path) -> Option<RgbaImage> {
    let icon = query_shell_icon(path, 0).or_else(|| {
        debug!("no direct icon for {}, using file-type icon", path.display());
        query_shell_icon(path, SHGFI_USEFILEATTRIBUTES)
    })?;

    let image = icon_to_rgba(icon);
    unsafe {
        DestroyIcon(icon);
    }
    image
}

fn query_shell_icon(path: &Path, extra_flags: u32) -> Option<HICON> {
    let wide: Vec<u16> = path
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    let mut info: SHFILEINFOW = unsafe { std::mem::zeroed() };
    let flags = SHGFI_ICON | SHGFI_LARGEICON | extra_flags;

    let result = unsafe {
        SHGetFileInfoW(
            wide.as_ptr(),
            FILE_ATTRIBUTE_NORMAL,
            &mut info,
            std::mem::size_of::<SHFILEINFOW>() as u32,
            flags,
        )
    };

    if result == 0 || info.hIcon.is_null() {
        None
    } else {
        Some(info.hIcon)
    }
}

/// Read the icon's color bitmap into a 32-bit RGBA buffer.
fn icon_to_rgba(icon: HICON) -> Option<RgbaImage> {
    unsafe {
        let mut icon_info: ICONINFO = std::mem::zeroed();
        if GetIconInfo(icon, &mut icon_info) == 0 {
            return None;
        }

        let mut bitmap: BITMAP = std::mem::zeroed();
        let got_object = GetObjectW(
            icon_info.hbmColor as _,
            std::mem::size_of::<BITMAP>() as i32,
            &mut bitmap as *mut BITMAP as *mut _,
        ) != 0;

        let image = if got_object && bitmap.bmWidth > 0 && bitmap.bmHeight > 0 {
            read_dib_pixels(icon_info.hbmColor as _, bitmap.bmWidth, bitmap.bmHeight)
        } else {
            None
        };

        DeleteObject(icon_info.hbmColor as _);
        DeleteObject(icon_info.hbmMask as _);

        image
    }
}

unsafe fn read_dib_pixels(
    hbm: windows_sys::Win32::Graphics::Gdi::HBITMAP,
    width: i32,
    height: i32,
) -> Option<RgbaImage> {
    let hdc = unsafe { GetDC(std::ptr::null_mut()) };
    if hdc.is_null() {
        return None;
    }

    let mut info: BITMAPINFO = unsafe { std::mem::zeroed() };
    info.bmiHeader = BITMAPINFOHEADER {
        biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
        biWidth: width,
        // Negative height requests a top-down DIB.
        biHeight: -height,
        biPlanes: 1,
        biBitCount: 32,
        biCompression: BI_RGB as u32,
        biSizeImage: 0,
        biXPelsPerMeter: 0,
        biYPelsPerMeter: 0,
        biClrUsed: 0,
        biClrImportant: 0,
    };

    let mut pixels = vec![0u8; (width as usize) * (height as usize) * 4];
    let copied = unsafe {
        GetDIBits(
            hdc,
            hbm,
            0,
            height as u32,
            pixels.as_mut_ptr() as *mut _,
            &mut info,
            DIB_RGB_COLORS,
        )
    };
    unsafe {
        ReleaseDC(std::ptr::null_mut(), hdc);
    }

    if copied == 0 {
        return None;
    }

    // GDI hands back BGRA; swap to RGBA. Icons without an alpha channel
    // come back fully transparent, so force them opaque.
    let mut has_alpha = false;
    for chunk in pixels.chunks_exact_mut(4) {
        chunk.swap(0, 2);
        if chunk[3] != 0 {
            has_alpha = true;
        }
    }
    if !has_alpha {
        for chunk in pixels.chunks_exact_mut(4) {
            chunk[3] = 255;
        }
    }

    RgbaImage::from_raw(width as u32, height as u32, pixels)
}
