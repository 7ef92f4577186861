fn main() -> std::io::Result<()> {
    // Exposes GIT_COMMIT_HASH and package metadata through `built_info`.
    built::write_built_file()
}
