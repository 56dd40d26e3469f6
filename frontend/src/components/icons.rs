//! 内联 SVG 图标（lucide 线条风格）
//!
//! 尺寸与颜色通过 `attr:class` 在调用处指定。

use leptos::prelude::*;

macro_rules! icon {
    ($name:ident, $($path:tt),+ $(,)?) => {
        #[component]
        pub fn $name() -> impl IntoView {
            view! {
                <svg
                    xmlns="http://www.w3.org/2000/svg"
                    viewBox="0 0 24 24"
                    fill="none"
                    stroke="currentColor"
                    stroke-width="2"
                    stroke-linecap="round"
                    stroke-linejoin="round"
                >
                    $(<path d=$path />)+
                </svg>
            }
        }
    };
}

icon!(LayoutDashboard, "M3 3h7v9H3z", "M14 3h7v5h-7z", "M14 12h7v9h-7z", "M3 16h7v5H3z");
icon!(
    Users,
    "M16 21v-2a4 4 0 0 0-4-4H6a4 4 0 0 0-4 4v2",
    "M9 11a4 4 0 1 0 0-8 4 4 0 0 0 0 8z",
    "M22 21v-2a4 4 0 0 0-3-3.87",
    "M16 3.13a4 4 0 0 1 0 7.75",
);
icon!(Upload, "M21 15v4a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2v-4", "M17 8l-5-5-5 5", "M12 3v12");
icon!(
    FileText,
    "M14 2H6a2 2 0 0 0-2 2v16a2 2 0 0 0 2 2h12a2 2 0 0 0 2-2V8z",
    "M14 2v6h6",
    "M16 13H8",
    "M16 17H8",
);
icon!(LogOut, "M9 21H5a2 2 0 0 1-2-2V5a2 2 0 0 1 2-2h4", "M16 17l5-5-5-5", "M21 12H9");
icon!(Plus, "M5 12h14", "M12 5v14");
icon!(Pencil, "M17 3a2.85 2.83 0 1 1 4 4L7.5 20.5 2 22l1.5-5.5z");
icon!(
    Trash2,
    "M3 6h18",
    "M19 6v14a2 2 0 0 1-2 2H7a2 2 0 0 1-2-2V6",
    "M8 6V4a2 2 0 0 1 2-2h4a2 2 0 0 1 2 2v2",
);
icon!(Search, "M11 19a8 8 0 1 0 0-16 8 8 0 0 0 0 16z", "M21 21l-4.3-4.3");
icon!(
    Eye,
    "M2 12s3-7 10-7 10 7 10 7-3 7-10 7-10-7-10-7z",
    "M12 15a3 3 0 1 0 0-6 3 3 0 0 0 0 6z",
);
icon!(
    EyeOff,
    "M9.88 9.88a3 3 0 1 0 4.24 4.24",
    "M10.73 5.08A10.43 10.43 0 0 1 12 5c7 0 10 7 10 7a13.16 13.16 0 0 1-1.67 2.68",
    "M6.61 6.61A13.53 13.53 0 0 0 2 12s3 7 10 7a9.74 9.74 0 0 0 5.39-1.61",
    "M2 2l20 20",
);
icon!(Download, "M21 15v4a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2v-4", "M7 10l5 5 5-5", "M12 15V3");
icon!(
    RefreshCw,
    "M3 12a9 9 0 0 1 9-9 9.75 9.75 0 0 1 6.74 2.74L21 8",
    "M21 3v5h-5",
    "M21 12a9 9 0 0 1-9 9 9.75 9.75 0 0 1-6.74-2.74L3 16",
    "M8 16H3v5",
);
icon!(
    ShieldCheck,
    "M12 22s8-4 8-10V5l-8-3-8 3v7c0 6 8 10 8 10z",
    "M9 12l2 2 4-4",
);
icon!(
    CheckCircle,
    "M22 11.08V12a10 10 0 1 1-5.93-9.14",
    "M22 4L12 14.01l-3-3",
);
icon!(
    AlertCircle,
    "M12 22a10 10 0 1 0 0-20 10 10 0 0 0 0 20z",
    "M12 8v4",
    "M12 16h.01",
);
icon!(X, "M18 6L6 18", "M6 6l12 12");
icon!(ChevronLeft, "M15 18l-6-6 6-6");
icon!(ChevronRight, "M9 18l6-6-6-6");
