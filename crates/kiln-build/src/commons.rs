//! Shared CMake options (CMakeCommons.cmake) and .clang-format
//!
//! Both documents are static: they do not depend on the project descriptor.

/// File name of the formatting style document
pub const CLANG_FORMAT_FILE_NAME: &str = ".clang-format";

/// Contents of `.clang-format`
pub const CLANG_FORMAT: &str = "BasedOnStyle: Google\nIndentWidth: 4\nColumnLimit: 100\n";

/// Standard headers precompiled into every C++ target
const STD_HEADERS: &[&str] = &[
    // C++ library
    "algorithm", "any", "array", "atomic", "bit", "bitset", "charconv", "chrono", "codecvt",
    "compare", "complex", "concepts", "condition_variable", "coroutine", "deque", "exception",
    "execution", "expected", "filesystem", "format", "forward_list", "fstream", "functional",
    "future", "initializer_list", "iomanip", "ios", "iosfwd", "iostream", "istream", "iterator",
    "limits", "list", "locale", "map", "memory", "memory_resource", "mutex", "new", "numbers",
    "numeric", "optional", "ostream", "queue", "random", "ranges", "ratio", "regex",
    "scoped_allocator", "set", "shared_mutex", "source_location", "span", "sstream", "stack",
    "stdexcept", "streambuf", "string", "string_view", "system_error", "thread", "tuple",
    "type_traits", "typeindex", "typeinfo", "unordered_map", "unordered_set", "utility",
    "valarray", "variant", "vector", "version",
    // C library
    "cassert", "cctype", "cerrno", "cfenv", "cfloat", "cinttypes", "climits", "clocale", "cmath",
    "csetjmp", "csignal", "cstdarg", "cstddef", "cstdint", "cstdio", "cstdlib", "cstring",
    "ctime", "cwchar", "cwctype",
];

const PROJECT_DEFAULTS: &str = r#"set(CMAKE_EXPORT_COMPILE_COMMANDS ON)

function(kiln_project_defaults)
    if(MSVC)
        if(POLICY CMP0141)
            cmake_policy(SET CMP0141 NEW)
            set(CMAKE_MSVC_DEBUG_INFORMATION_FORMAT "$<IF:$<AND:$<C_COMPILER_ID:MSVC>,$<CXX_COMPILER_ID:MSVC>>,$<$<CONFIG:Debug,RelWithDebInfo>:EditAndContinue>,$<$<CONFIG:Debug,RelWithDebInfo>:ProgramDatabase>>" PARENT_SCOPE)
        endif()
    endif()
    cmake_policy(SET CMP0069 NEW)
    set(CMAKE_POLICY_DEFAULT_CMP0069 NEW PARENT_SCOPE)

    if(WIN32)
        add_definitions(-DWIN32_LEAN_AND_MEAN -DNOMINMAX -D_CRT_SECURE_NO_WARNINGS -D_SDL_MAIN_HANDLED)
    endif()
endfunction()

function(kiln_enable_static_analysis)
    find_program(CLANG_TIDY_EXE NAMES clang-tidy)
    if(CLANG_TIDY_EXE)
        set(CLANG_TIDY_CHECKS
            "clang-analyzer-*,hicpp-*,readability-simplify-boolean-expr,readability-delete-null-pointer,portability-simd-intrinsics"
        )
        set(CLANG_TIDY_ARGS
            --warnings-as-errors=*
            -header-filter=.*
            --checks=${CLANG_TIDY_CHECKS}
            --format-style=file
        )
        set(CMAKE_C_CLANG_TIDY "${CLANG_TIDY_EXE};${CLANG_TIDY_ARGS}" PARENT_SCOPE)
        set(CMAKE_CXX_CLANG_TIDY "${CLANG_TIDY_EXE};${CLANG_TIDY_ARGS}" PARENT_SCOPE)
    else()
        message(WARNING "clang-tidy not found! Static analysis will be skipped.")
    endif()

    if(CMAKE_CXX_COMPILER_ID MATCHES "Clang|GNU")
        add_compile_options(-Wall -Wextra -Wpedantic -Wshadow -Wconversion -Wsign-conversion)
    elseif(MSVC)
        add_compile_options(/W4 /permissive-)
    endif()

    if(MSVC)
        message(STATUS "MSVC detected: enabling AddressSanitizer")
        add_compile_options(/fsanitize=address /Zi /Od)
        add_link_options(/INCREMENTAL:NO /fsanitize=address)
    else()
        set(KILN_SANITIZERS "address,undefined")
        if(UNIX)
            set(KILN_SANITIZERS "${KILN_SANITIZERS},leak")
        endif()
        add_compile_options(-fsanitize=${KILN_SANITIZERS} -fno-omit-frame-pointer -g)
        add_link_options(-fsanitize=${KILN_SANITIZERS})
    endif()
endfunction()

if(EMSCRIPTEN)
    # No dyndep scanning for PCH under emscripten
    set(CMAKE_NINJA_FORCE_RESPONSE_FILE 1)
endif()
"#;

/// Contents of `CMakeCommons.cmake`
pub fn commons_document() -> String {
    let mut text = String::from(PROJECT_DEFAULTS);
    text.push_str("\nfunction(kiln_precompile_std_headers TARGET_NAME)\n");
    text.push_str("    target_precompile_headers(${TARGET_NAME} PRIVATE\n");
    for header in STD_HEADERS {
        text.push_str("        <");
        text.push_str(header);
        text.push_str(">\n");
    }
    text.push_str("    )\nendfunction()\n");
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_defines_all_functions() {
        let text = commons_document();
        assert!(text.starts_with("set(CMAKE_EXPORT_COMPILE_COMMANDS ON)\n"));
        assert!(text.contains("function(kiln_project_defaults)"));
        assert!(text.contains("function(kiln_enable_static_analysis)"));
        assert!(text.contains("function(kiln_precompile_std_headers TARGET_NAME)"));
        assert!(text.ends_with("    )\nendfunction()\n"));
    }

    #[test]
    fn test_headers_listed_once() {
        let mut seen = HashSet::new();
        for header in STD_HEADERS {
            assert!(seen.insert(header), "duplicate header <{}>", header);
        }
        assert!(commons_document().contains("        <string_view>\n"));
    }

    #[test]
    fn test_clang_format() {
        assert_eq!(CLANG_FORMAT.lines().count(), 3);
        assert!(CLANG_FORMAT.contains("ColumnLimit: 100"));
    }
}
